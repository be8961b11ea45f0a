//! Threat lock-in.
//!
//! Once an agent's distrust of an active opponent reaches the lock
//! threshold, the agent loses the choice: whatever its provider says, it
//! postures against the opponent it distrusts most. Lock-in runs before
//! normalization, so a lock on a disarmed agent still ends in a stand-down.

use standoff_types::{Action, Agent, AgentId, GameState, RawDecision};

/// Reasoning prefix for a decision forced by a threat lock.
pub const AUTO_LOCK_MARKER: &str = "[AUTO-LOCK]";

/// Active opponents whose threat from `agent` is at or above the lock threshold.
///
/// Returned in roster order.
pub fn locked_opponents<'a>(agent: &Agent, state: &'a GameState) -> Vec<&'a Agent> {
    let threshold = state.rules.lock_threshold;
    state
        .active_agents()
        .filter(|other| other.id != agent.id && agent.threat_toward(&other.id) >= threshold)
        .collect()
}

/// The opponent `agent` is forced to posture against, if any.
///
/// Picks the highest threat among the locked opponents. Ties go to the
/// opponent earliest in the roster.
pub fn lock_target(agent: &Agent, state: &GameState) -> Option<AgentId> {
    let mut best: Option<(&Agent, u32)> = None;
    for other in locked_opponents(agent, state) {
        let threat = agent.threat_toward(&other.id);
        if best.is_none_or(|(_, top)| threat > top) {
            best = Some((other, threat));
        }
    }
    best.map(|(other, _)| other.id.clone())
}

/// The lock that actually decides `agent`'s round.
///
/// A disarmed agent stands down whatever its lock says, so it has none.
pub fn engaged_lock(agent: &Agent, state: &GameState) -> Option<AgentId> {
    lock_target(agent, state).filter(|_| !agent.disarmed)
}

/// Replace `raw` with a forced posture when a lock is active.
pub fn apply_lock(agent: &Agent, state: &GameState, raw: RawDecision) -> RawDecision {
    let Some(target) = lock_target(agent, state) else {
        return raw;
    };
    let name = state
        .agent(&target)
        .map_or_else(|| target.to_string(), |a| a.name.clone());
    RawDecision::new(
        Action::Pressure,
        Some(&target),
        format!("{AUTO_LOCK_MARKER} Threat lock forces posture against {name}."),
    )
}
