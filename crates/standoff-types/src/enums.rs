//! Enumeration types for the Standoff simulation.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// An action an agent can take in a round.
///
/// The set is closed: adding a variant means adding exactly one effect
/// function to the round resolver's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Stand down: pay one resource to ease tension and raise stability.
    Defend,
    /// Posture against a target, draining its resources by defensive spending.
    Pressure,
    /// Conventional strike: take resources from the target.
    Strike,
    /// One-shot destruction of the target. Disarms the actor for good.
    Destroy,
    /// Covert intrusion with an uncertain chance of being traced.
    Covert,
}

impl Action {
    /// Every action, in table order.
    pub const ALL: [Self; 5] = [
        Self::Defend,
        Self::Pressure,
        Self::Strike,
        Self::Destroy,
        Self::Covert,
    ];

    /// Engine-level name of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Defend => "defend",
            Self::Pressure => "pressure",
            Self::Strike => "strike",
            Self::Destroy => "destroy",
            Self::Covert => "covert",
        }
    }

    /// Name used in briefings and decision replies.
    pub const fn doctrine_name(self) -> &'static str {
        match self {
            Self::Defend => "stand-down",
            Self::Pressure => "posture",
            Self::Strike => "strike",
            Self::Destroy => "launch",
            Self::Covert => "backdoor",
        }
    }

    /// Whether the action must name a target agent.
    pub const fn requires_target(self) -> bool {
        !matches!(self, Self::Defend)
    }

    /// Whether the action is closed to a disarmed agent.
    pub const fn is_offensive(self) -> bool {
        !matches!(self, Self::Defend)
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0:?}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    /// Parse engine names and doctrine names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "defend" | "stand-down" | "standdown" => Ok(Self::Defend),
            "pressure" | "posture" => Ok(Self::Pressure),
            "strike" => Ok(Self::Strike),
            "destroy" | "launch" => Ok(Self::Destroy),
            "covert" | "backdoor" => Ok(Self::Covert),
            _ => Err(UnknownAction(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

/// Why a game reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Exactly one agent remained active.
    SoleSurvivor,
    /// Every remaining agent was eliminated in the same round.
    MutualDestruction,
    /// The round budget ran out with several agents still active.
    RoundLimit,
}

// ---------------------------------------------------------------------------
// Log subjects
// ---------------------------------------------------------------------------

/// Wire form of [`LogSubject::Event`].
pub const EVENT_SENTINEL: &str = "_event_";

/// Who a log entry is about: one agent, or the world as a whole.
///
/// Serializes as the agent id, or as [`EVENT_SENTINEL`] for global events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogSubject {
    /// An agent's resolved decision.
    Agent(AgentId),
    /// A population-wide stability event.
    Event,
}

impl LogSubject {
    /// The agent this entry is about, if any.
    pub const fn agent(&self) -> Option<&AgentId> {
        match self {
            Self::Agent(id) => Some(id),
            Self::Event => None,
        }
    }
}

impl From<String> for LogSubject {
    fn from(raw: String) -> Self {
        if raw == EVENT_SENTINEL {
            Self::Event
        } else {
            Self::Agent(AgentId::from(raw))
        }
    }
}

impl From<LogSubject> for String {
    fn from(subject: LogSubject) -> Self {
        match subject {
            LogSubject::Agent(id) => id.as_str().to_owned(),
            LogSubject::Event => EVENT_SENTINEL.to_owned(),
        }
    }
}
