//! The LLM-backed [`DecisionProvider`].

use std::time::{Duration, Instant};

use standoff_core::{DecisionProvider, ProviderError};
use standoff_types::{Agent, GameState, RawDecision};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::RunnerConfig;
use crate::error::RunnerError;
use crate::llm::{self, LlmBackend};
use crate::parse::parse_reply;
use crate::prompt::PromptEngine;

/// Asks an LLM for each agent's decision.
///
/// At most `max_concurrent_calls` requests are in flight at once; the rest
/// of a round's calls queue on the semaphore. The `decision_timeout_ms`
/// deadline starts once a call holds its permit, so time spent queued never
/// counts against it. A missed deadline surfaces as
/// [`ProviderError::Timeout`], any other failure as
/// [`ProviderError::Backend`], for that agent alone.
pub struct LlmDecisionProvider {
    backend: LlmBackend,
    prompts: PromptEngine,
    permits: Semaphore,
}

impl LlmDecisionProvider {
    /// Assemble a provider from its parts.
    pub fn new(backend: LlmBackend, prompts: PromptEngine, max_concurrent_calls: usize) -> Self {
        Self {
            backend,
            prompts,
            permits: Semaphore::new(max_concurrent_calls.max(1)),
        }
    }

    /// Build the backend and prompt engine described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if template overrides cannot be loaded.
    pub fn from_config(config: &RunnerConfig) -> Result<Self, RunnerError> {
        let prompts = match &config.templates_dir {
            Some(dir) => PromptEngine::from_dir(dir)?,
            None => PromptEngine::new()?,
        };
        Ok(Self::new(
            llm::create_backend(&config.backend),
            prompts,
            config.max_concurrent_calls,
        ))
    }

    async fn ask(&self, agent: &Agent, state: &GameState) -> Result<RawDecision, RunnerError> {
        let prompt = self.prompts.render(agent, state)?;
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| RunnerError::LlmBackend(format!("call limiter closed: {e}")))?;

        let started = Instant::now();
        let deadline_ms = state.rules.decision_timeout_ms;
        let call = self.backend.complete(&prompt);
        let reply = if deadline_ms == 0 {
            call.await?
        } else {
            tokio::time::timeout(Duration::from_millis(deadline_ms), call)
                .await
                .unwrap_or(Err(RunnerError::Timeout { deadline_ms }))?
        };
        debug!(
            agent = %agent.id,
            round = state.round,
            backend = self.backend.name(),
            model = self.backend.model(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "LLM replied"
        );

        Ok(parse_reply(&reply, state))
    }
}

impl DecisionProvider for LlmDecisionProvider {
    async fn decide(&self, agent: &Agent, state: &GameState) -> Result<RawDecision, ProviderError> {
        self.ask(agent, state).await.map_err(|e| match e {
            RunnerError::Timeout { deadline_ms } => ProviderError::Timeout { deadline_ms },
            other => ProviderError::Backend {
                message: other.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        self.backend.name()
    }

    fn enforces_deadline(&self) -> bool {
        true
    }
}
