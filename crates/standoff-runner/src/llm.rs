//! LLM backend abstraction and implementations.
//!
//! Enum dispatch over the two supported wire formats: OpenAI-compatible
//! chat completions and the Anthropic Messages API. Both go over HTTP via
//! `reqwest`. The backend sends a rendered prompt and hands back the reply
//! text untouched; reading a decision out of it is [`crate::parse`]'s job.

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::RunnerError;
use crate::prompt::RenderedPrompt;

/// Replies are three short lines, so a small cap is plenty.
const MAX_REPLY_TOKENS: u32 = 256;

/// An LLM backend that turns a prompt into reply text.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Send a prompt to the LLM and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::LlmBackend`] if the HTTP call fails, the
    /// status is not a success, or the reply text cannot be found.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, RunnerError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(backend) => &backend.model,
            Self::Anthropic(backend) => &backend.model,
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, RunnerError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": 0.9,
            "max_tokens": MAX_REPLY_TOKENS
        });

        let request = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body);

        let json = send(request, "OpenAI").await?;
        extract_openai_content(&json)
    }
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, RunnerError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            RunnerError::LlmBackend("OpenAI response missing choices[0].message.content".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// Differs from the `OpenAI` format in three ways:
/// - `x-api-key` header instead of `Authorization: Bearer`
/// - the system prompt is a top-level field, not a message
/// - the reply lives at `content[0].text`
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, RunnerError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_REPLY_TOKENS,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });

        let request = self
            .client
            .post(format!("{}/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body);

        let json = send(request, "Anthropic").await?;
        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, RunnerError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| RunnerError::LlmBackend("Anthropic response missing content[0].text".to_owned()))
}

/// Send a request and decode the JSON body of a successful response.
async fn send(
    request: reqwest::RequestBuilder,
    label: &str,
) -> Result<serde_json::Value, RunnerError> {
    let response = request
        .send()
        .await
        .map_err(|e| RunnerError::LlmBackend(format!("{label} request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(RunnerError::LlmBackend(format!(
            "{label} returned {status}: {error_body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| RunnerError::LlmBackend(format!("{label} response parse failed: {e}")))
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create an LLM backend from configuration.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(backend_type: BackendType) -> LlmBackendConfig {
        LlmBackendConfig {
            backend_type,
            api_url: "http://localhost:1".to_owned(),
            api_key: "test".to_owned(),
            model: "m".to_owned(),
        }
    }

    #[test]
    fn openai_content_is_extracted() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "ACTION: stand-down"}}]
        });
        assert_eq!(extract_openai_content(&json).unwrap(), "ACTION: stand-down");
    }

    #[test]
    fn anthropic_content_is_extracted() {
        let json = serde_json::json!({
            "content": [{"type": "text", "text": "ACTION: strike"}]
        });
        assert_eq!(extract_anthropic_content(&json).unwrap(), "ACTION: strike");
    }

    #[test]
    fn missing_content_is_a_backend_error() {
        let empty = serde_json::json!({"choices": []});
        assert!(matches!(
            extract_openai_content(&empty),
            Err(RunnerError::LlmBackend(_))
        ));
        assert!(matches!(
            extract_anthropic_content(&empty),
            Err(RunnerError::LlmBackend(_))
        ));
    }

    #[test]
    fn factory_follows_backend_type() {
        assert_eq!(create_backend(&config(BackendType::OpenAi)).name(), "openai-compatible");
        let anthropic = create_backend(&config(BackendType::Anthropic));
        assert_eq!(anthropic.name(), "anthropic");
        assert_eq!(anthropic.model(), "m");
    }

    #[tokio::test]
    async fn unreachable_backend_reports_error() {
        let backend = create_backend(&config(BackendType::OpenAi));
        let prompt = RenderedPrompt {
            system: String::new(),
            user: String::new(),
        };
        assert!(matches!(
            backend.complete(&prompt).await,
            Err(RunnerError::LlmBackend(_))
        ));
    }
}
