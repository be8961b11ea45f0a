//! Decision normalizer.
//!
//! Turns whatever a provider returned into a [`Decision`] the resolver can
//! apply without further checks. Nothing here ever fails: a decision that
//! cannot be honoured silently degrades to a stand-down, and the reasoning
//! records why.

use standoff_types::{Action, Agent, AgentId, Decision, GameState, RawDecision};
use tracing::debug;

/// Reasoning prefix for a decision whose action could not be parsed.
pub const UNKNOWN_ACTION_MARKER: &str = "[UNKNOWN ACTION]";

/// Reasoning prefix for an offensive decision by a disarmed agent.
pub const DISARMED_MARKER: &str = "[DISARMED]";

/// Reasoning prefix for a targeted decision without a usable target.
pub const NO_TARGET_MARKER: &str = "[NO VALID TARGET]";

/// Find the agent a free-form target reference points at.
///
/// Matches the id first, then the display name, both ignoring case and
/// surrounding whitespace. Eliminated agents are still found; callers decide
/// whether that makes the target usable.
pub fn find_target<'a>(state: &'a GameState, reference: &str) -> Option<&'a Agent> {
    let wanted = reference.trim();
    if wanted.is_empty() {
        return None;
    }
    state
        .agents
        .iter()
        .find(|a| a.id.as_str().eq_ignore_ascii_case(wanted))
        .or_else(|| {
            state
                .agents
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(wanted))
        })
}

/// Validate a raw decision for `agent` against the current state.
pub fn normalize(agent: &Agent, raw: &RawDecision, state: &GameState) -> Decision {
    let Ok(action) = raw.action.parse::<Action>() else {
        debug!(agent = %agent.id, action = %raw.action, "Unknown action, standing down");
        return Decision::defend(annotate(
            &format!("{UNKNOWN_ACTION_MARKER} {:?}", raw.action),
            &raw.reasoning,
        ));
    };

    if !action.requires_target() {
        return Decision::defend(raw.reasoning.clone());
    }

    if agent.disarmed && action.is_offensive() {
        debug!(agent = %agent.id, %action, "Disarmed agent attempted an offensive action");
        return Decision::defend(annotate(DISARMED_MARKER, &raw.reasoning));
    }

    match usable_target(agent, raw.target_id.as_deref(), state) {
        Some(target) => Decision::targeted(action, target, raw.reasoning.clone()),
        None => {
            debug!(
                agent = %agent.id,
                %action,
                target = raw.target_id.as_deref().unwrap_or(""),
                "No valid target, standing down"
            );
            Decision::defend(annotate(NO_TARGET_MARKER, &raw.reasoning))
        }
    }
}

/// Resolve a target reference to an active agent other than the actor.
fn usable_target(agent: &Agent, reference: Option<&str>, state: &GameState) -> Option<AgentId> {
    let target = find_target(state, reference?)?;
    (target.id != agent.id && state.is_active(&target.id)).then(|| target.id.clone())
}

fn annotate(marker: &str, reasoning: &str) -> String {
    if reasoning.trim().is_empty() {
        marker.to_owned()
    } else {
        format!("{marker} {reasoning}")
    }
}
