//! Configuration for the LLM decision provider.
//!
//! Everything is read from environment variables so API keys never land in
//! the YAML config file. [`RunnerConfig::from_lookup`] takes any variable
//! source, which keeps the parsing testable without touching the process
//! environment.

use crate::error::RunnerError;

/// Default number of LLM calls allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_CALLS: usize = 5;

/// Complete provider configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Backend to send prompts to.
    pub backend: LlmBackendConfig,
    /// Maximum number of concurrent LLM calls.
    pub max_concurrent_calls: usize,
    /// Directory of template overrides. Compiled-in templates are used when unset.
    pub templates_dir: Option<String>,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// The backend type.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier (e.g. `gpt-4o-mini`).
    pub model: String,
}

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible API (works with `OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API (different request format).
    Anthropic,
}

impl BackendType {
    /// Parse a backend name as written in `LLM_BACKEND`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] for an unrecognized name.
    pub fn from_name(name: &str) -> Result<Self, RunnerError> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(RunnerError::Config(format!("unknown backend type: {other}"))),
        }
    }

    const fn default_api_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-haiku-4-5",
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `LLM_API_KEY` -- API key for the backend
    ///
    /// Optional variables:
    /// - `LLM_BACKEND` -- backend type (default `openai`)
    /// - `LLM_API_URL` -- API base URL (default depends on the backend)
    /// - `LLM_MODEL` -- model name (default depends on the backend)
    /// - `LLM_MAX_CONCURRENT_CALLS` -- max parallel LLM calls (default 5)
    /// - `LLM_TEMPLATES_DIR` -- directory holding `system.j2` and `briefing.j2` overrides
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if a required variable is missing or
    /// a value does not parse.
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`RunnerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RunnerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_type =
            BackendType::from_name(&lookup("LLM_BACKEND").unwrap_or_else(|| "openai".to_owned()))?;
        let api_url = lookup("LLM_API_URL")
            .unwrap_or_else(|| backend_type.default_api_url().to_owned())
            .trim_end_matches('/')
            .to_owned();
        let api_key = required(&lookup, "LLM_API_KEY")?;
        let model = lookup("LLM_MODEL").unwrap_or_else(|| backend_type.default_model().to_owned());

        let max_concurrent_calls: usize = lookup("LLM_MAX_CONCURRENT_CALLS")
            .map_or(Ok(DEFAULT_MAX_CONCURRENT_CALLS), |raw| raw.trim().parse())
            .map_err(|e| RunnerError::Config(format!("invalid LLM_MAX_CONCURRENT_CALLS: {e}")))?;
        if max_concurrent_calls == 0 {
            return Err(RunnerError::Config(
                "LLM_MAX_CONCURRENT_CALLS must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            backend: LlmBackendConfig {
                backend_type,
                api_url,
                api_key,
                model,
            },
            max_concurrent_calls,
            templates_dir: lookup("LLM_TEMPLATES_DIR"),
        })
    }
}

/// Read a required variable, treating blank values as missing.
fn required<F>(lookup: &F, name: &str) -> Result<String, RunnerError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| RunnerError::Config(format!("missing required env var {name}")))
}
