//! Messages-API provider (Anthropic wire format).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    build_http_client, read_body, transport_error, CompletionRequest, LlmProvider,
    ProviderError, ProviderSettings,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [AnthropicMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    /// Text of the first text block.
    fn text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<AnthropicError>(body)
        .ok()
        .map(|e| e.error.message)
}

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl AnthropicProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(settings.timeout)?,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            endpoint: format!("{}/messages", settings.base_url.trim_end_matches('/')),
            timeout: settings.timeout,
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        // The messages API has no JSON mode; the system prompt carries that instruction.
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system,
            messages: [AnthropicMessage {
                role: "user",
                content: request.prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let raw = read_body(response, self.timeout, error_message).await?;
        let parsed: MessagesResponse = serde_json::from_str(&raw)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "anthropic call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        parsed
            .text()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ProviderError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String) -> AnthropicProvider {
        AnthropicProvider::new(&ProviderSettings {
            api_key: "anthropic-key".to_string(),
            model: "claude-test".to_string(),
            base_url,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_analyze_reads_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "anthropic-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{
                    "type": "text",
                    "text": "```json\n{\"primary_type\": \"C\", \"confidence_score\": 0.7}\n```"
                }],
                "usage": {"input_tokens": 120, "output_tokens": 40}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let value = provider(server.uri())
            .analyze("Detail-oriented data engineer")
            .await
            .unwrap();
        assert_eq!(value["primary_type"], "C");
    }

    #[tokio::test]
    async fn test_overloaded_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_json(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(server.uri())
            .analyze("some profile text")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 529, .. }));
    }

    #[tokio::test]
    async fn test_missing_text_block_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "tool_use", "id": "x"}]
            })))
            .mount(&server)
            .await;

        assert!(matches!(
            provider(server.uri()).analyze("some profile text").await,
            Err(ProviderError::EmptyContent)
        ));
    }
}
