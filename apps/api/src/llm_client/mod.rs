//! LLM provider clients. The only code in PersonaFlow that talks to a model API.
//!
//! Every provider implements [`LlmProvider`]. Clients make exactly one
//! outbound request per call with a fixed timeout and never retry;
//! cascading across providers belongs to `analysis::pipeline`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use thiserror::Error;

pub mod anthropic;
pub mod openai;
pub mod prompts;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

use prompts::{DISC_ANALYSIS_PROMPT, DISC_ANALYSIS_SYSTEM};

const ANALYSIS_MAX_TOKENS: u32 = 1200;
const ANALYSIS_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("Response failed schema validation: {0}")]
    Schema(String),
}

/// Connection settings for one provider, read from the environment.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// One completion call.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask the provider for a JSON object when its API supports it.
    pub json_output: bool,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Sends one completion request and returns the text content.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError>;

    /// Runs the fixed DISC instruction prompt over `text` and returns the
    /// parsed JSON object. Schema checks are left to the response normalizer.
    async fn analyze(&self, text: &str) -> Result<Value, ProviderError> {
        let prompt = DISC_ANALYSIS_PROMPT.replace("{profile_text}", text);
        let content = self
            .complete(CompletionRequest {
                system: DISC_ANALYSIS_SYSTEM,
                prompt: &prompt,
                max_tokens: ANALYSIS_MAX_TOKENS,
                temperature: ANALYSIS_TEMPERATURE,
                json_output: true,
            })
            .await?;
        parse_json_content(&content)
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Maps a transport error, separating timeouts from other failures.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::Http(err)
    }
}

/// Reads the whole body; non-2xx statuses become `ProviderError::Api`.
pub(crate) async fn read_body(
    response: Response,
    timeout: Duration,
    extract_message: fn(&str) -> Option<String>,
) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    if !status.is_success() {
        let message = extract_message(&body).unwrap_or(body);
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(body)
}

/// Parses model output as a JSON object, tolerating markdown code fences.
pub fn parse_json_content(content: &str) -> Result<Value, ProviderError> {
    let text = strip_json_fences(content);
    if text.is_empty() {
        return Err(ProviderError::EmptyContent);
    }
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(ProviderError::Schema(
            "expected a JSON object at the top level".to_string(),
        ));
    }
    Ok(value)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

#[cfg(test)]
pub mod mock {
    //! Scripted provider for pipeline and router tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    pub enum Script {
        Json(Value),
        Text(String),
        Fail,
    }

    pub struct MockProvider {
        name: String,
        script: Mutex<Script>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        pub fn returning_json(name: &str, value: Value) -> Self {
            Self::with_script(name, Script::Json(value))
        }

        pub fn returning_text(name: &str, text: &str) -> Self {
            Self::with_script(name, Script::Text(text.to_string()))
        }

        pub fn failing(name: &str) -> Self {
            Self::with_script(name, Script::Fail)
        }

        fn with_script(name: &str, script: Script) -> Self {
            Self {
                name: name.to_string(),
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn complete(&self, _request: CompletionRequest<'_>) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &*self.script.lock().unwrap() {
                Script::Json(value) => Ok(value.to_string()),
                Script::Text(text) => Ok(text.clone()),
                Script::Fail => Err(ProviderError::Api {
                    status: 503,
                    message: format!("{} unavailable", self.name),
                }),
            }
        }
    }
}
