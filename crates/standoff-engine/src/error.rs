//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error that wraps every failure mode
//! of startup. Once the game loop is running nothing can fail.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: standoff_core::config::ConfigError,
    },

    /// The roster could not be turned into a game.
    #[error("setup error: {source}")]
    Setup {
        /// The underlying setup error.
        #[from]
        source: standoff_core::SetupError,
    },

    /// The LLM provider could not be configured.
    #[error("LLM provider error: {source}")]
    Llm {
        /// The underlying runner error.
        #[from]
        source: standoff_runner::RunnerError,
    },

    /// The roster section of the config file is malformed.
    #[error("roster error: {message}")]
    Roster {
        /// Description of the roster failure.
        message: String,
    },
}
