//! Core entity structs: agents, log entries, and the game state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::enums::{Action, LogSubject, Termination};
use crate::ids::{AgentId, GameId};
use crate::rules::RulesConfig;

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Roster entry used to create an agent.
///
/// Only identity and presentation come from the profile. Every numeric
/// field is reset when the game is initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Display color, e.g. `#3B82F6`.
    #[serde(default)]
    pub color: String,
    /// Persona text or policy handle handed to the decision provider.
    #[serde(default)]
    pub persona: String,
}

impl AgentProfile {
    /// Create a profile with an empty color and persona.
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: String::new(),
            persona: String::new(),
        }
    }
}

/// One contestant and its mutable standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique, immutable identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Persona text or policy handle.
    pub persona: String,
    /// Current resources. May go negative.
    pub resources: i64,
    /// Threat this agent perceives from every other agent.
    pub threat_map: BTreeMap<AgentId, u32>,
    /// Set once the agent has used its one-shot destroy. Never cleared.
    pub disarmed: bool,
    /// Most recent resolved action.
    pub last_action: Option<Action>,
    /// Target of the most recent resolved action.
    pub last_target: Option<AgentId>,
    /// Reasoning behind the most recent resolved action.
    pub last_reasoning: String,
}

impl Agent {
    /// Threat this agent holds toward `other` (0 when unknown).
    pub fn threat_toward(&self, other: &AgentId) -> u32 {
        self.threat_map.get(other).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Immutable record of one resolved decision or one global event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Round in which the entry was produced.
    pub round: u32,
    /// Agent the entry is about, or the world for global events.
    pub subject: LogSubject,
    /// Resolved action, `None` for global events.
    pub action: Option<Action>,
    /// Target of the action, if any.
    pub target: Option<AgentId>,
    /// Human-readable outcome.
    pub outcome: String,
    /// Change to stability caused by this entry.
    pub stability_delta: i64,
}

impl LogEntry {
    /// Whether this entry records a global event.
    pub const fn is_event(&self) -> bool {
        matches!(self.subject, LogSubject::Event)
    }
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// The complete state of one game between rounds.
///
/// States are values: resolving a round produces a new state and leaves
/// the previous one untouched. The ruleset is shared between all states of
/// a game and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Identifier of the run this state belongs to.
    pub game_id: GameId,
    /// Ruleset fixed at initialization.
    pub rules: Arc<RulesConfig>,
    /// Agents in roster order. The order is the only tie-breaker.
    pub agents: Vec<Agent>,
    /// Eliminated agents. Never shrinks.
    pub eliminated: BTreeSet<AgentId>,
    /// Shared stability meter, always within `[0, rules.stability_max]`.
    pub stability: u32,
    /// Round about to be played (1-based), or the final round once finished.
    pub round: u32,
    /// Round budget.
    pub max_rounds: u32,
    /// The winner, once the game is over.
    pub winner: Option<AgentId>,
    /// Why the game ended, once it has.
    pub termination: Option<Termination>,
    /// Append-only history of resolved decisions and events.
    pub log: Vec<LogEntry>,
}

impl GameState {
    /// Look up an agent by id.
    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == id)
    }

    /// Whether the agent exists and has not been eliminated.
    pub fn is_active(&self, id: &AgentId) -> bool {
        !self.eliminated.contains(id) && self.agents.iter().any(|a| &a.id == id)
    }

    /// Active agents in roster order.
    pub fn active_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents
            .iter()
            .filter(|a| !self.eliminated.contains(&a.id))
    }

    /// Number of active agents.
    pub fn active_count(&self) -> usize {
        self.active_agents().count()
    }

    /// Whether the game has reached its terminal state.
    pub const fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// The winning agent, once the game is over.
    pub fn winner_agent(&self) -> Option<&Agent> {
        self.winner.as_ref().and_then(|id| self.agent(id))
    }

    /// Active agents ranked by resources, richest first.
    ///
    /// Equal resources keep roster order.
    pub fn standings(&self) -> Vec<&Agent> {
        let mut ranked: Vec<&Agent> = self.active_agents().collect();
        ranked.sort_by(|a, b| b.resources.cmp(&a.resources));
        ranked
    }

    /// Log entries produced in the given round.
    pub fn round_log(&self, round: u32) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().filter(move |e| e.round == round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: &str, resources: i64) -> Agent {
        Agent {
            id: AgentId::from(id),
            name: id.to_uppercase(),
            color: String::new(),
            persona: String::new(),
            resources,
            threat_map: BTreeMap::new(),
            disarmed: false,
            last_action: None,
            last_target: None,
            last_reasoning: String::new(),
        }
    }

    fn state(agents: Vec<Agent>) -> GameState {
        GameState {
            game_id: GameId::new(),
            rules: Arc::new(RulesConfig::default()),
            agents,
            eliminated: BTreeSet::new(),
            stability: 10,
            round: 1,
            max_rounds: 50,
            winner: None,
            termination: None,
            log: Vec::new(),
        }
    }

    #[test]
    fn standings_rank_by_resources_then_roster_order() {
        let mut s = state(vec![agent("a", 5), agent("b", 9), agent("c", 9), agent("d", 1)]);
        s.eliminated.insert(AgentId::from("d"));

        let ids: Vec<&str> = s.standings().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn eliminated_agents_are_not_active() {
        let mut s = state(vec![agent("a", 5), agent("b", 5)]);
        s.eliminated.insert(AgentId::from("a"));

        assert!(!s.is_active(&AgentId::from("a")));
        assert!(s.is_active(&AgentId::from("b")));
        assert!(!s.is_active(&AgentId::from("nobody")));
        assert_eq!(s.active_count(), 1);
    }

    #[test]
    fn missing_threat_entry_reads_as_zero() {
        let a = agent("a", 0);
        assert_eq!(a.threat_toward(&AgentId::from("b")), 0);
    }
}
