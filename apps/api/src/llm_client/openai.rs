//! Chat-completions provider (OpenAI wire format).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    build_http_client, read_body, transport_error, CompletionRequest, LlmProvider,
    ProviderError, ProviderSettings,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<OpenAiError>(body)
        .ok()
        .map(|e| e.error.message)
}

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(settings.timeout)?,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            endpoint: format!(
                "{}/chat/completions",
                settings.base_url.trim_end_matches('/')
            ),
            timeout: settings.timeout,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_output.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let raw = read_body(response, self.timeout, error_message).await?;
        let parsed: ChatResponse = serde_json::from_str(&raw)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "openai call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String, timeout: Duration) -> ProviderSettings {
        ProviderSettings {
            api_key: "test-key".to_string(),
            model: "gpt-test".to_string(),
            base_url,
            timeout,
        }
    }

    fn analysis_content() -> String {
        json!({
            "disc_scores": {"D": 0.8, "I": 0.4, "S": 0.2, "C": 0.5},
            "primary_type": "D",
            "confidence_score": 0.85,
            "strengths": ["Decisive"],
            "challenges": ["Impatient"],
            "motivators": ["Winning"],
            "communication_dos": ["Be brief"],
            "communication_donts": ["Ramble"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_analyze_reads_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-test",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": analysis_content()}}],
                "usage": {"prompt_tokens": 100, "completion_tokens": 50}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(server.uri(), Duration::from_secs(5))).unwrap();
        let value = provider.analyze("A decisive sales leader").await.unwrap();
        assert_eq!(value["primary_type"], "D");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided"}
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(server.uri(), Duration::from_secs(5))).unwrap();
        let err = provider.analyze("some text here").await.unwrap_err();
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(server.uri(), Duration::from_secs(5))).unwrap();
        assert!(matches!(
            provider.analyze("some text here").await,
            Err(ProviderError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_non_json_content_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "I think this person is a D."}}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(server.uri(), Duration::from_secs(5))).unwrap();
        assert!(provider.analyze("some text here").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(server.uri(), Duration::from_secs(5))).unwrap();
        assert!(matches!(
            provider.analyze("some text here").await,
            Err(ProviderError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider =
            OpenAiProvider::new(&settings(server.uri(), Duration::from_millis(100))).unwrap();
        assert!(matches!(
            provider.analyze("some text here").await,
            Err(ProviderError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_plain_completion_omits_response_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "Hi Sam, quick note."}}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(&settings(server.uri(), Duration::from_secs(5))).unwrap();
        let text = provider
            .complete(CompletionRequest {
                system: "sys",
                prompt: "write",
                max_tokens: 100,
                temperature: 0.7,
                json_output: false,
            })
            .await
            .unwrap();
        assert_eq!(text, "Hi Sam, quick note.");

        let requests = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(sent.get("response_format").is_none());
    }
}
