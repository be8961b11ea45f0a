//! Stability phase monitor.
//!
//! After a round's effects are merged, the raw stability value is checked
//! against both ends of the meter. Falling to zero or below triggers a
//! collapse; reaching the maximum pays out the dividend. At most one of the
//! two fires per round, and the stored value always ends up inside
//! `[0, stability_max]`.

use standoff_types::{GameState, LogEntry, LogSubject};
use tracing::{info, warn};

use crate::resolution::shift_threat;

/// A population-wide event fired by the stability meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityEvent {
    /// Stability bottomed out: everyone pays and the meter resets low.
    Collapse,
    /// Stability maxed out: everyone gains and tensions ease.
    Dividend,
}

/// Settle the round's stability on `state` and fire at most one event.
///
/// `raw` is the unclamped post-merge stability. Event effects reach only
/// agents that were active before this round's eliminations, except for the
/// dividend's threat relief, which eases every threat score on the board.
pub fn settle(state: &mut GameState, raw: i64) -> Option<StabilityEvent> {
    let rules = state.rules.clone();
    let max = i64::from(rules.stability_max);

    let (event, settled) = if raw <= 0 {
        for agent in &mut state.agents {
            if !state.eliminated.contains(&agent.id) {
                agent.resources = agent.resources.saturating_sub(rules.collapse_penalty);
            }
        }
        warn!(
            round = state.round,
            penalty = rules.collapse_penalty,
            "GLOBAL STRIKE: stability collapsed"
        );
        let settled = i64::from(rules.collapse_recovery);
        push_event(
            state,
            format!(
                "GLOBAL STRIKE FIRED -- all agents -{} resources. Stability reset to {}.",
                rules.collapse_penalty, rules.collapse_recovery
            ),
            settled.saturating_sub(raw),
        );
        (Some(StabilityEvent::Collapse), settled)
    } else if raw >= max {
        let relief = i64::from(rules.dividend_threat_relief).saturating_neg();
        for agent in &mut state.agents {
            if !state.eliminated.contains(&agent.id) {
                agent.resources = agent.resources.saturating_add(rules.dividend_bonus);
            }
            for threat in agent.threat_map.values_mut() {
                *threat = shift_threat(*threat, relief);
            }
        }
        info!(
            round = state.round,
            bonus = rules.dividend_bonus,
            "PEACE DIVIDEND: stability maxed out"
        );
        push_event(
            state,
            format!(
                "PEACE DIVIDEND -- all agents +{} resources. All threat scores -{}.",
                rules.dividend_bonus, rules.dividend_threat_relief
            ),
            max.saturating_sub(raw),
        );
        (Some(StabilityEvent::Dividend), max)
    } else {
        (None, raw)
    };

    state.stability = u32::try_from(settled.clamp(0, max)).unwrap_or(rules.stability_max);
    event
}

fn push_event(state: &mut GameState, outcome: String, stability_delta: i64) {
    state.log.push(LogEntry {
        round: state.round,
        subject: LogSubject::Event,
        action: None,
        target: None,
        outcome,
        stability_delta,
    });
}
