//! OpenAI-compatible HTTP clients for summarization and embeddings.
//!
//! Both clients talk to any endpoint implementing the OpenAI REST shape
//! (`/chat/completions`, `/embeddings`). They are plain values built from
//! [`OpenAiConfig`] and handed to the pipeline; nothing here is global.

mod chat;
mod embeddings;
pub mod prompt;

use std::time::Duration;

use reqwest::Client;
use srsguard_shared::{OpenAiConfig, Result, SrsGuardError, UpstreamService};

pub use chat::ChatSummarizer;
pub use embeddings::OpenAiEmbedder;

/// User-Agent string for outbound requests.
const USER_AGENT: &str = concat!("srsguard/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error body echoed into our own error messages.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Connection settings shared by the chat and embedding clients.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Bearer token. `None` for local endpoints that need no auth.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientOptions {
    /// Build options from the `[openai]` config section and a resolved key.
    pub fn from_config(config: &OpenAiConfig, api_key: Option<String>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &ClientOptions, service: UpstreamService) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(opts.timeout)
        .build()
        .map_err(|e| SrsGuardError::upstream(service, format!("failed to build HTTP client: {e}")))
}

/// Join an API path onto the base URL, tolerating a trailing slash.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// POST a JSON body and decode a JSON response, mapping every failure onto
/// an upstream error for `service`.
async fn post_json<B, R>(
    client: &Client,
    opts: &ClientOptions,
    url: &str,
    body: &B,
    service: UpstreamService,
) -> Result<R>
where
    B: serde::Serialize + ?Sized,
    R: serde::de::DeserializeOwned,
{
    let mut req = client.post(url).json(body);
    if let Some(key) = &opts.api_key {
        req = req.bearer_auth(key);
    }

    let response = req
        .send()
        .await
        .map_err(|e| SrsGuardError::upstream(service, format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        return Err(SrsGuardError::upstream(
            service,
            format!("{url}: HTTP {status}: {snippet}"),
        ));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| SrsGuardError::upstream(service, format!("{url}: invalid response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_paths() {
        assert_eq!(
            endpoint("https://api.openai.com/v1", "embeddings"),
            "https://api.openai.com/v1/embeddings"
        );
        assert_eq!(
            endpoint("http://localhost:1234/v1/", "chat/completions"),
            "http://localhost:1234/v1/chat/completions"
        );
    }

    #[test]
    fn options_from_config() {
        let config = OpenAiConfig::default();
        let opts = ClientOptions::from_config(&config, Some("sk-test".into()));
        assert_eq!(opts.base_url, "https://api.openai.com/v1");
        assert_eq!(opts.timeout, Duration::from_secs(120));
        assert_eq!(opts.api_key.as_deref(), Some("sk-test"));
    }
}
