//! Provider selection.
//!
//! [`DecisionProvider`] is not object safe, so the engine picks its
//! provider through an enum instead of a trait object.

use standoff_core::config::{EngineConfig, ProviderKind};
use standoff_core::{DecisionProvider, ProviderError, StandDownProvider};
use standoff_runner::{LlmDecisionProvider, RunnerConfig};
use standoff_types::{Agent, GameState, RawDecision};
use tracing::info;

use crate::doctrine::DoctrineProvider;
use crate::error::EngineError;

/// The provider chosen by configuration.
pub enum EngineProvider {
    /// Everyone stands down.
    StandDown(StandDownProvider),
    /// Seeded persona doctrines.
    Doctrine(DoctrineProvider),
    /// An LLM backend.
    Llm(Box<LlmDecisionProvider>),
}

impl EngineProvider {
    /// Build the provider named in `config.provider.kind`.
    ///
    /// The LLM provider reads its own settings from the environment.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let provider = match config.provider.kind {
            ProviderKind::StandDown => Self::StandDown(StandDownProvider::new()),
            ProviderKind::Scripted => Self::Doctrine(DoctrineProvider::new(config.game.seed)),
            ProviderKind::Llm => {
                let runner = RunnerConfig::from_env()?;
                info!(
                    backend = ?runner.backend.backend_type,
                    model = runner.backend.model,
                    max_concurrent_calls = runner.max_concurrent_calls,
                    "LLM provider configured"
                );
                Self::Llm(Box::new(LlmDecisionProvider::from_config(&runner)?))
            }
        };
        Ok(provider)
    }
}

impl DecisionProvider for EngineProvider {
    async fn decide(&self, agent: &Agent, state: &GameState) -> Result<RawDecision, ProviderError> {
        match self {
            Self::StandDown(p) => p.decide(agent, state).await,
            Self::Doctrine(p) => p.decide(agent, state).await,
            Self::Llm(p) => p.decide(agent, state).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::StandDown(p) => p.name(),
            Self::Doctrine(p) => p.name(),
            Self::Llm(p) => p.name(),
        }
    }

    fn enforces_deadline(&self) -> bool {
        match self {
            Self::StandDown(p) => p.enforces_deadline(),
            Self::Doctrine(p) => p.enforces_deadline(),
            Self::Llm(p) => p.enforces_deadline(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use standoff_core::config::ProviderConfig;

    use super::*;

    fn config(kind: ProviderKind) -> EngineConfig {
        EngineConfig {
            provider: ProviderConfig { kind },
            ..EngineConfig::default()
        }
    }

    #[test]
    fn offline_kinds_need_no_environment() {
        assert_eq!(
            EngineProvider::from_config(&config(ProviderKind::StandDown)).unwrap().name(),
            "stand-down"
        );
        assert_eq!(
            EngineProvider::from_config(&config(ProviderKind::Scripted)).unwrap().name(),
            "doctrine"
        );
    }

    #[test]
    fn offline_kinds_leave_the_deadline_to_gathering() {
        let provider = EngineProvider::from_config(&config(ProviderKind::Scripted)).unwrap();
        assert!(!provider.enforces_deadline());
    }
}
