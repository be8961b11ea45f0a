//! Error types for the LLM decision provider.
//!
//! Uses `thiserror` for typed errors covering configuration, prompt
//! rendering, the HTTP call, and reply parsing. None of these abort a
//! round: the provider maps them to a `ProviderError` and the agent
//! stands down.

/// Errors that can occur while asking an LLM for a decision.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Failed to load or render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// The backend did not reply within the decision deadline.
    #[error("no reply within {deadline_ms}ms")]
    Timeout {
        /// The deadline in milliseconds.
        deadline_ms: u64,
    },

    /// The LLM reply could not be read as a decision.
    #[error("reply parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
