//! Embeddings client.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use srsguard_shared::{OpenAiConfig, Result, SrsGuardError, UpstreamService};
use tracing::{debug, instrument};

use crate::{ClientOptions, build_client, endpoint, post_json};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Maps text to a vector via an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    opts: ClientOptions,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(opts: ClientOptions, config: &OpenAiConfig) -> Result<Self> {
        let client = build_client(&opts, UpstreamService::Embedder)?;
        Ok(Self {
            client,
            opts,
            model: config.embedding_model.clone(),
        })
    }

    /// Embed a single string.
    #[instrument(skip_all, fields(model = %self.model, chars = text.len()))]
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };
        let url = endpoint(&self.opts.base_url, "embeddings");
        let response: EmbeddingResponse = post_json(
            &self.client,
            &self.opts,
            &url,
            &request,
            UpstreamService::Embedder,
        )
        .await?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                SrsGuardError::upstream(
                    UpstreamService::Embedder,
                    "response contained no embedding",
                )
            })?;

        debug!(dimension = embedding.len(), "embedding received");
        Ok(embedding)
    }
}
