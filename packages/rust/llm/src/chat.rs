//! Chat-completion summarizer.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use srsguard_shared::{OpenAiConfig, Result, SrsGuardError, UpstreamService};
use tracing::{debug, instrument};

use crate::prompt::render_summary_prompt;
use crate::{ClientOptions, build_client, endpoint, post_json};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Summarizes extracted SRS text with a chat model.
///
/// Returns the model's raw answer; splitting it into summary and skills is
/// the output parser's job.
#[derive(Debug, Clone)]
pub struct ChatSummarizer {
    client: Client,
    opts: ClientOptions,
    model: String,
    temperature: f32,
    max_input_chars: usize,
}

impl ChatSummarizer {
    pub fn new(opts: ClientOptions, config: &OpenAiConfig) -> Result<Self> {
        let client = build_client(&opts, UpstreamService::Summarizer)?;
        Ok(Self {
            client,
            opts,
            model: config.chat_model.clone(),
            temperature: config.temperature,
            max_input_chars: config.max_input_chars,
        })
    }

    /// Send the SRS prompt for `text` and return the raw completion.
    #[instrument(skip_all, fields(model = %self.model, chars = text.len()))]
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let prompt = render_summary_prompt(text, self.max_input_chars);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
        };

        let url = endpoint(&self.opts.base_url, "chat/completions");
        let response: ChatResponse = post_json(
            &self.client,
            &self.opts,
            &url,
            &request,
            UpstreamService::Summarizer,
        )
        .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                SrsGuardError::upstream(
                    UpstreamService::Summarizer,
                    "chat completion returned no content",
                )
            })?;

        debug!(chars = content.len(), "summary received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summarizer_for(server: &MockServer) -> ChatSummarizer {
        let opts = ClientOptions {
            base_url: format!("{}/v1", server.uri()),
            api_key: Some("sk-test".into()),
            timeout: Duration::from_secs(5),
        };
        ChatSummarizer::new(opts, &OpenAiConfig::default()).expect("build summarizer")
    }

    #[tokio::test]
    async fn summarize_returns_raw_completion() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": "SUMMARY:\nInventory tracker\n\nSKILLS:\nRust"
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = summarizer_for(&server)
            .summarize("1.1 Purpose: inventory")
            .await
            .expect("summarize");
        assert_eq!(output, "SUMMARY:\nInventory tracker\n\nSKILLS:\nRust");
    }

    #[tokio::test]
    async fn http_error_is_upstream_summarizer_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = summarizer_for(&server).summarize("text").await.unwrap_err();
        match err {
            SrsGuardError::Upstream { service, message } => {
                assert_eq!(service, UpstreamService::Summarizer);
                assert!(message.contains("503"));
                assert!(message.contains("overloaded"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn null_content_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": null } }]
            })))
            .mount(&server)
            .await;

        let err = summarizer_for(&server).summarize("text").await.unwrap_err();
        assert!(err.to_string().contains("no content"));
    }
}
