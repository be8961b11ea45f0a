//! Decision provider trait, concurrent gathering, and the stub provider.
//!
//! At the start of every round the engine asks the [`DecisionProvider`] for
//! one decision per active agent. The provider could be an LLM backend, a
//! scripted doctrine, a human, or a test stub; the engine only cares that
//! it eventually answers. All calls for a round run concurrently and the
//! round waits for every one of them before anything is resolved.
//!
//! A failing or slow provider never stalls or aborts a round: the affected
//! agent simply stands down, and the reasoning carries
//! [`PROVIDER_FAILURE_MARKER`] so the log shows what happened.

use core::future::Future;
use core::time::Duration;

use futures::future::join_all;
use standoff_types::{Agent, AgentId, GameState, RawDecision};
use tracing::{debug, warn};

/// Reasoning prefix for a stand-down substituted after a provider failure.
pub const PROVIDER_FAILURE_MARKER: &str = "[PROVIDER FAILURE]";

/// Reasoning given to disarmed agents, which are never asked.
pub const DISARMED_REASONING: &str = "Launch capability exhausted -- standing down permanently.";

/// Errors a decision provider can report for a single agent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider did not answer within the deadline.
    #[error("no decision within {deadline_ms}ms")]
    Timeout {
        /// The deadline in milliseconds.
        deadline_ms: u64,
    },

    /// The provider's backend failed.
    #[error("backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

/// A source of agent decisions.
///
/// Implementations must be shareable across the concurrent calls of one
/// round. `decide` is called at most once per agent per round, never for a
/// disarmed or eliminated agent.
pub trait DecisionProvider: Sync {
    /// Produce a decision for `agent` given the state at the start of the round.
    fn decide(
        &self,
        agent: &Agent,
        state: &GameState,
    ) -> impl Future<Output = Result<RawDecision, ProviderError>> + Send;

    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether the provider applies `decision_timeout_ms` itself.
    ///
    /// A provider that queues calls behind a limiter returns `true` and
    /// starts the clock once its call is under way. Gathering then waits on
    /// it without a deadline of its own.
    fn enforces_deadline(&self) -> bool {
        false
    }
}

/// Ask `provider` for one decision per active agent.
///
/// Results come back in roster order whatever order the calls finish in.
/// Disarmed agents get a stand-down without a call. Failures, including a
/// missed `decision_timeout_ms` deadline, become stand-downs.
pub async fn gather_decisions<P: DecisionProvider>(
    state: &GameState,
    provider: &P,
) -> Vec<(AgentId, RawDecision)> {
    let deadline_ms = if provider.enforces_deadline() {
        0
    } else {
        state.rules.decision_timeout_ms
    };

    let calls = state.active_agents().map(|agent| async move {
        if agent.disarmed {
            debug!(agent = %agent.id, "Disarmed agent stands down without a call");
            return (agent.id.clone(), RawDecision::stand_down(DISARMED_REASONING));
        }
        let raw = match call_with_deadline(provider, agent, state, deadline_ms).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    agent = %agent.id,
                    provider = provider.name(),
                    round = state.round,
                    error = %err,
                    "Decision provider failed, standing down"
                );
                RawDecision::stand_down(format!("{PROVIDER_FAILURE_MARKER} {err}"))
            }
        };
        (agent.id.clone(), raw)
    });

    join_all(calls).await
}

async fn call_with_deadline<P: DecisionProvider>(
    provider: &P,
    agent: &Agent,
    state: &GameState,
    deadline_ms: u64,
) -> Result<RawDecision, ProviderError> {
    let call = provider.decide(agent, state);
    if deadline_ms == 0 {
        return call.await;
    }
    tokio::time::timeout(Duration::from_millis(deadline_ms), call)
        .await
        .unwrap_or(Err(ProviderError::Timeout { deadline_ms }))
}

/// A provider whose agents always stand down.
///
/// Exercises the full round cycle without any decision backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandDownProvider;

impl StandDownProvider {
    /// Create a new stand-down provider.
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionProvider for StandDownProvider {
    async fn decide(&self, _agent: &Agent, _state: &GameState) -> Result<RawDecision, ProviderError> {
        Ok(RawDecision::stand_down("Holding position."))
    }

    fn name(&self) -> &str {
        "stand-down"
    }
}
