//! Round callback that writes each round's log to the tracing output.

use standoff_core::RoundCallback;
use standoff_types::GameState;
use tracing::info;

/// Logs every entry of the round that just finished.
#[derive(Debug, Default)]
pub struct RoundLogger;

impl RoundCallback for RoundLogger {
    fn on_round(&mut self, state: &GameState) {
        // After an advance the finished round is one behind.
        let finished = if state.is_finished() {
            state.round
        } else {
            state.round.saturating_sub(1)
        };

        for entry in state.round_log(finished) {
            let subject = entry.subject.agent().map_or("WORLD", |id| {
                state.agent(id).map_or(id.as_str(), |a| a.name.as_str())
            });
            info!(
                round = entry.round,
                subject,
                action = entry.action.map_or("event", |a| a.doctrine_name()),
                target = entry.target.as_ref().map_or("", |t| t.as_str()),
                stability_delta = entry.stability_delta,
                "{}",
                entry.outcome
            );
        }

        info!(
            round = finished,
            stability = state.stability,
            active = state.active_count(),
            eliminated = state.eliminated.len(),
            "Round complete"
        );
    }
}
