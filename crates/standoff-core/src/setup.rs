//! Building the opening state of a game.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use standoff_types::{
    Agent, AgentId, AgentProfile, EVENT_SENTINEL, GameId, GameState, InvalidRules, RulesConfig,
};
use tracing::info;

/// Errors that can occur when setting up a game.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The roster has no agents.
    #[error("roster is empty")]
    EmptyRoster,

    /// Two roster entries share an id.
    #[error("duplicate agent id: {id}")]
    DuplicateAgent {
        /// The repeated id.
        id: AgentId,
    },

    /// A roster entry uses the id reserved for global log events.
    #[error("agent id {id} is reserved")]
    ReservedId {
        /// The offending id.
        id: AgentId,
    },

    /// The ruleset failed validation.
    #[error("invalid rules: {source}")]
    InvalidRules {
        /// The violated constraint.
        #[from]
        source: InvalidRules,
    },
}

/// Create the opening state for `roster` under `rules`.
///
/// Numeric fields are never taken from the profiles: every agent starts
/// with the configured endowment, a zero threat score toward every other
/// agent, and its destroy still available.
///
/// # Errors
///
/// Returns [`SetupError`] if the roster is empty, contains a duplicate or
/// reserved id, or if `rules` fails validation.
pub fn initialize(roster: &[AgentProfile], rules: RulesConfig) -> Result<GameState, SetupError> {
    rules.validate()?;
    if roster.is_empty() {
        return Err(SetupError::EmptyRoster);
    }

    let mut seen = BTreeSet::new();
    for profile in roster {
        if profile.id.as_str() == EVENT_SENTINEL {
            return Err(SetupError::ReservedId {
                id: profile.id.clone(),
            });
        }
        if !seen.insert(profile.id.clone()) {
            return Err(SetupError::DuplicateAgent {
                id: profile.id.clone(),
            });
        }
    }

    let agents: Vec<Agent> = roster
        .iter()
        .map(|profile| Agent {
            id: profile.id.clone(),
            name: profile.name.clone(),
            color: profile.color.clone(),
            persona: profile.persona.clone(),
            resources: rules.initial_resources,
            threat_map: roster
                .iter()
                .filter(|other| other.id != profile.id)
                .map(|other| (other.id.clone(), 0))
                .collect::<BTreeMap<_, _>>(),
            disarmed: false,
            last_action: None,
            last_target: None,
            last_reasoning: String::new(),
        })
        .collect();

    let state = GameState {
        game_id: GameId::new(),
        agents,
        eliminated: BTreeSet::new(),
        stability: rules.stability_start,
        round: 1,
        max_rounds: rules.max_rounds,
        winner: None,
        termination: None,
        log: Vec::new(),
        rules: Arc::new(rules),
    };

    info!(
        game_id = %state.game_id,
        agents = state.agents.len(),
        max_rounds = state.max_rounds,
        stability = state.stability,
        "Game initialized"
    );

    Ok(state)
}
