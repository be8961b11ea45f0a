//! Round orchestration: one call turns a state into the next state.
//!
//! Each round runs through these phases:
//!
//! 1. **Gather** -- ask the provider for every active agent's decision,
//!    concurrently, and wait for all of them.
//! 2. **Lock-in** -- override the decision of every agent under a threat lock.
//! 3. **Normalize** -- degrade anything unusable to a stand-down.
//! 4. **Resolve** -- compute every decision's effects against the
//!    start-of-round state and merge them.
//! 5. **Stability** -- fire a collapse or a dividend if the meter crossed
//!    either end, then clamp it.
//! 6. **Outcome** -- eliminate, detect a winner, or advance the round.
//!
//! The input state is never modified. Once a state has a winner, both entry
//! points hand it back unchanged.

use standoff_types::{AgentId, Decision, GameState, RawDecision};
use tracing::{debug, info};

use crate::covert::CovertRoll;
use crate::decision::{self, DecisionProvider};
use crate::{lockin, normalize, outcome, resolution, stability};

/// Reasoning for an active agent that a driver supplied no decision for.
pub const MISSING_DECISION_REASONING: &str = "[NO DECISION] Standing down.";

/// Play one full round, asking `provider` for every active agent's decision.
pub async fn resolve_round<P: DecisionProvider>(
    state: &GameState,
    provider: &P,
    coin: &mut dyn CovertRoll,
) -> GameState {
    if state.is_finished() {
        debug!(round = state.round, "Game already finished, round ignored");
        return state.clone();
    }

    info!(
        game_id = %state.game_id,
        round = state.round,
        active = state.active_count(),
        stability = state.stability,
        provider = provider.name(),
        "Round starting"
    );

    let gathered = decision::gather_decisions(state, provider).await;
    resolve_decisions(state, &gathered, coin)
}

/// Play one round from decisions the caller already holds.
///
/// Applies lock-in and normalization exactly as [`resolve_round`] does.
/// Active agents without an entry stand down; entries for anyone else are
/// ignored.
pub fn resolve_decisions(
    state: &GameState,
    raw: &[(AgentId, RawDecision)],
    coin: &mut dyn CovertRoll,
) -> GameState {
    if state.is_finished() {
        return state.clone();
    }

    let decisions = prepare_decisions(state, raw);
    let effects = resolution::resolve_effects(state, &decisions, coin);
    let (mut next, raw_stability) = resolution::merge_effects(state, &decisions, &effects);
    let event = stability::settle(&mut next, raw_stability);
    let eliminated = outcome::evaluate(&mut next, &effects.destroyed);

    debug!(
        round = state.round,
        stability = next.stability,
        eliminated = eliminated.len(),
        group_bonus = effects.group_bonus,
        event = ?event,
        "Round resolved"
    );

    next
}

/// Lock in and normalize one decision per active agent, in roster order.
pub fn prepare_decisions(state: &GameState, raw: &[(AgentId, RawDecision)]) -> Vec<(AgentId, Decision)> {
    state
        .active_agents()
        .map(|agent| {
            let supplied = raw
                .iter()
                .find(|(id, _)| id == &agent.id)
                .map_or_else(
                    || RawDecision::stand_down(MISSING_DECISION_REASONING),
                    |(_, r)| r.clone(),
                );
            if let Some(target) = lockin::engaged_lock(agent, state) {
                info!(
                    round = state.round,
                    agent = %agent.id,
                    target = %target,
                    "Threat lock engaged"
                );
            }
            let locked = lockin::apply_lock(agent, state, supplied);
            (agent.id.clone(), normalize::normalize(agent, &locked, state))
        })
        .collect()
}
