//! Collaborator traits and the service handles injected into the pipeline.
//!
//! Each collaborator is an object-safe async trait so the server and tests
//! can swap in their own implementations. [`Services::from_config`] wires
//! the production ones: pdf-extract, the OpenAI-compatible clients, and the
//! libSQL corpus.

use std::sync::Arc;

use async_trait::async_trait;
use srsguard_extract::{EXTRACTION_FAILED, extract_text};
use srsguard_llm::{ChatSummarizer, ClientOptions, OpenAiEmbedder};
use srsguard_shared::{
    AppConfig, ExtractionKind, Result, SimilarityMatch, SrsGuardError, SubmittedDocument,
    UpstreamService, resolve_api_key,
};
use srsguard_storage::Storage;
use tracing::info;

/// Document bytes to plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, data: &[u8]) -> Result<String>;
}

/// Extracted text to raw `SUMMARY:` / `SKILLS:` output.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Text to a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Persistent store of admitted documents.
#[async_trait]
pub trait Corpus: Send + Sync {
    /// Up to `k` nearest documents to `vector`, best first.
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<SimilarityMatch>>;

    /// Store a novel document.
    async fn insert(&self, doc: &SubmittedDocument) -> Result<()>;

    /// Number of stored documents.
    async fn count(&self) -> Result<u64>;
}

// ---------------------------------------------------------------------------
// Production adapters
// ---------------------------------------------------------------------------

/// [`TextExtractor`] backed by `srsguard-extract`, run off the async runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, data: &[u8]) -> Result<String> {
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || extract_text(&data))
            .await
            .map_err(|e| {
                SrsGuardError::extraction(
                    ExtractionKind::Failed,
                    format!("{EXTRACTION_FAILED}: {e}"),
                )
            })?
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        ChatSummarizer::summarize(self, text).await
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        OpenAiEmbedder::embed(self, text).await
    }
}

#[async_trait]
impl Corpus for Storage {
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<SimilarityMatch>> {
        Storage::search(self, vector, k).await
    }

    async fn insert(&self, doc: &SubmittedDocument) -> Result<()> {
        self.insert_document(doc).await
    }

    async fn count(&self) -> Result<u64> {
        self.count_documents().await
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Collaborator handles for one running service.
///
/// Cheap to clone; every request shares the same handles.
#[derive(Clone)]
pub struct Services {
    pub extractor: Arc<dyn TextExtractor>,
    pub summarizer: Arc<dyn Summarizer>,
    pub embedder: Arc<dyn Embedder>,
    pub corpus: Arc<dyn Corpus>,
    /// Neighbours requested per search.
    pub top_k: usize,
}

impl Services {
    /// Build the production collaborators from config.
    ///
    /// Fails if the API key env var is unset or the corpus cannot be opened.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = resolve_api_key(config)?;
        let opts = ClientOptions::from_config(&config.openai, Some(api_key));

        let summarizer = ChatSummarizer::new(opts.clone(), &config.openai)?;
        let embedder = OpenAiEmbedder::new(opts, &config.openai)?;

        let corpus_path = config.corpus_path()?;
        let storage = Storage::open(&corpus_path, config.corpus.dimension).await?;
        let documents = storage.count_documents().await?;
        info!(
            path = %corpus_path.display(),
            dimension = storage.dimension(),
            documents,
            "corpus ready"
        );

        Ok(Self {
            extractor: Arc::new(PdfExtractor),
            summarizer: Arc::new(summarizer),
            embedder: Arc::new(embedder),
            corpus: Arc::new(storage),
            top_k: config.corpus.top_k,
        })
    }
}

/// Attribute a collaborator failure to `service`.
///
/// Errors already tagged with that service pass through unchanged.
pub(crate) fn upstream_error(
    service: UpstreamService,
) -> impl FnOnce(SrsGuardError) -> SrsGuardError {
    move |err| match err {
        SrsGuardError::Upstream { service: s, .. } if s == service => err,
        other => SrsGuardError::upstream(service, other.to_string()),
    }
}
