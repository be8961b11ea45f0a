//! Game loop runner.
//!
//! This module provides [`run_game`], the top-level async function that
//! plays rounds until a winner is declared. The round budget guarantees the
//! loop ends; no task outlives the call.

use core::time::Duration;

use standoff_types::{GameState, Termination};
use tracing::info;

use crate::covert::CovertRoll;
use crate::decision::DecisionProvider;
use crate::round;

/// Result of a finished game.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// The terminal state.
    pub final_state: GameState,
    /// Number of rounds played by this call.
    pub rounds_played: u32,
}

/// Callback invoked after each round completes.
///
/// Implementations can use this to print round logs, update a display,
/// or collect statistics.
pub trait RoundCallback: Send {
    /// Called with the state produced by the round that just finished.
    fn on_round(&mut self, state: &GameState);
}

/// A no-op round callback for testing.
pub struct NoOpCallback;

impl RoundCallback for NoOpCallback {
    fn on_round(&mut self, _state: &GameState) {}
}

/// Play rounds until the game is over.
///
/// Sleeps `round_interval` between rounds when it is non-zero. A state that
/// is already finished is returned as is.
pub async fn run_game<P: DecisionProvider>(
    state: GameState,
    provider: &P,
    coin: &mut dyn CovertRoll,
    callback: &mut dyn RoundCallback,
    round_interval: Duration,
) -> GameResult {
    let mut current = state;
    let mut rounds_played: u32 = 0;

    info!(
        game_id = %current.game_id,
        agents = current.agents.len(),
        max_rounds = current.max_rounds,
        provider = provider.name(),
        "Game starting"
    );

    while !current.is_finished() {
        current = round::resolve_round(&current, provider, coin).await;
        rounds_played = rounds_played.saturating_add(1);
        callback.on_round(&current);

        if !current.is_finished() && !round_interval.is_zero() {
            tokio::time::sleep(round_interval).await;
        }
    }

    GameResult {
        final_state: current,
        rounds_played,
    }
}

/// Log the end of a game with the final standings.
pub fn log_game_end(result: &GameResult) {
    let state = &result.final_state;
    info!(
        game_id = %state.game_id,
        rounds_played = result.rounds_played,
        final_round = state.round,
        winner = state.winner_agent().map_or("none", |a| a.name.as_str()),
        termination = termination_label(state.termination),
        survivors = state.active_count(),
        stability = state.stability,
        "Game ended"
    );
    for (rank, agent) in state.standings().iter().enumerate() {
        info!(
            rank = rank.saturating_add(1),
            agent = %agent.id,
            resources = agent.resources,
            disarmed = agent.disarmed,
            "Final standing"
        );
    }
}

const fn termination_label(termination: Option<Termination>) -> &'static str {
    match termination {
        Some(Termination::SoleSurvivor) => "sole_survivor",
        Some(Termination::MutualDestruction) => "mutual_destruction",
        Some(Termination::RoundLimit) => "round_limit",
        None => "unfinished",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use standoff_types::{AgentProfile, RulesConfig};

    use super::*;
    use crate::covert::FixedCovert;
    use crate::decision::StandDownProvider;
    use crate::setup::initialize;

    struct Counter(u32);

    impl RoundCallback for Counter {
        fn on_round(&mut self, _state: &GameState) {
            self.0 = self.0.saturating_add(1);
        }
    }

    fn game(max_rounds: u32) -> GameState {
        let roster = vec![
            AgentProfile::new("a", "A"),
            AgentProfile::new("b", "B"),
        ];
        let rules = RulesConfig {
            max_rounds,
            ..RulesConfig::default()
        };
        initialize(&roster, rules).unwrap()
    }

    #[tokio::test]
    async fn stand_down_game_runs_to_round_limit() {
        let mut counter = Counter(0);
        let result = run_game(
            game(6),
            &StandDownProvider,
            &mut FixedCovert::never_traced(),
            &mut counter,
            Duration::ZERO,
        )
        .await;

        assert_eq!(result.rounds_played, 6);
        assert_eq!(counter.0, 6);
        assert_eq!(result.final_state.round, 6);
        assert_eq!(
            result.final_state.termination,
            Some(Termination::RoundLimit)
        );
        assert_eq!(result.final_state.winner.as_ref().map(|w| w.as_str()), Some("a"));
        log_game_end(&result);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_sleeps_between_rounds() {
        let start = tokio::time::Instant::now();
        let result = run_game(
            game(3),
            &StandDownProvider,
            &mut FixedCovert::never_traced(),
            &mut NoOpCallback,
            Duration::from_millis(500),
        )
        .await;

        assert_eq!(result.rounds_played, 3);
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn finished_game_plays_no_rounds() {
        let mut state = game(5);
        state.winner = Some(state.agents.first().unwrap().id.clone());
        let result = run_game(
            state,
            &StandDownProvider,
            &mut FixedCovert::never_traced(),
            &mut NoOpCallback,
            Duration::ZERO,
        )
        .await;
        assert_eq!(result.rounds_played, 0);
    }
}
