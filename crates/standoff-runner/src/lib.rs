//! LLM-backed decision provider for the Standoff simulation.
//!
//! Renders each agent's situation into a prompt, sends it to an
//! OpenAI-compatible or Anthropic backend, and reads the reply back into a
//! raw decision. Everything past that point (lock-in, validation, effects)
//! belongs to `standoff-core`.
//!
//! # Modules
//!
//! - [`config`] -- Environment-based configuration.
//! - [`error`] -- Error types.
//! - [`llm`] -- Backend enum dispatch over the HTTP APIs.
//! - [`prompt`] -- Prompt templates.
//! - [`parse`] -- Reply parsing with recovery strategies.
//! - [`provider`] -- [`LlmDecisionProvider`].

pub mod config;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod provider;

pub use config::{BackendType, LlmBackendConfig, RunnerConfig};
pub use error::RunnerError;
pub use provider::LlmDecisionProvider;
