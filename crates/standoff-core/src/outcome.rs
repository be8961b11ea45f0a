//! Elimination and win evaluation.

use standoff_types::{Agent, AgentId, GameState, Termination};
use tracing::info;

/// Apply this round's eliminations and decide whether the game is over.
///
/// Destroyed targets are eliminated whatever their resources; anyone else
/// still standing goes out at or below the elimination floor. The round
/// counter only advances when the game continues.
///
/// Returns the agents eliminated this round, in roster order.
pub fn evaluate(state: &mut GameState, destroyed: &[AgentId]) -> Vec<AgentId> {
    let floor = state.rules.elimination_floor;
    let newly: Vec<AgentId> = state
        .agents
        .iter()
        .filter(|a| !state.eliminated.contains(&a.id))
        .filter(|a| destroyed.contains(&a.id) || a.resources <= floor)
        .map(|a| a.id.clone())
        .collect();

    for id in &newly {
        info!(round = state.round, agent = %id, "Agent eliminated");
        state.eliminated.insert(id.clone());
    }

    let survivors: Vec<&Agent> = state.active_agents().collect();
    let verdict = match survivors.as_slice() {
        [sole] => Some((sole.id.clone(), Termination::SoleSurvivor)),
        [] => richest(state.agents.iter()).map(|a| (a.id.clone(), Termination::MutualDestruction)),
        _ if state.round >= state.max_rounds => {
            richest(survivors.iter().copied()).map(|a| (a.id.clone(), Termination::RoundLimit))
        }
        _ => None,
    };

    match verdict {
        Some((winner, termination)) => {
            info!(
                round = state.round,
                winner = %winner,
                ?termination,
                "Game over"
            );
            state.winner = Some(winner);
            state.termination = Some(termination);
        }
        None => state.round = state.round.saturating_add(1),
    }

    newly
}

/// The agent with the most resources; the earliest in roster order on ties.
pub fn richest<'a>(agents: impl Iterator<Item = &'a Agent>) -> Option<&'a Agent> {
    agents.fold(None, |best: Option<&'a Agent>, a| match best {
        Some(b) if b.resources >= a.resources => Some(b),
        _ => Some(a),
    })
}
