//! Decision payloads exchanged between the engine and decision providers.
//!
//! A provider answers with a [`RawDecision`]: loosely typed, possibly
//! nonsensical. The engine turns every raw decision into a [`Decision`]
//! before resolving the round, so nothing downstream ever sees an unknown
//! action or a dangling target.

use serde::{Deserialize, Serialize};

use crate::enums::Action;
use crate::ids::AgentId;

/// A decision exactly as a provider returned it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawDecision {
    /// Requested action name. Engine names and doctrine names are accepted.
    pub action: String,
    /// Requested target, by id or display name.
    #[serde(default)]
    pub target_id: Option<String>,
    /// Free-form reasoning. Displayed, never interpreted.
    #[serde(default)]
    pub reasoning: String,
}

impl RawDecision {
    /// Build a raw decision from parts.
    pub fn new(action: Action, target: Option<&AgentId>, reasoning: impl Into<String>) -> Self {
        Self {
            action: action.as_str().to_owned(),
            target_id: target.map(|t| t.as_str().to_owned()),
            reasoning: reasoning.into(),
        }
    }

    /// A stand-down with the given reasoning.
    pub fn stand_down(reasoning: impl Into<String>) -> Self {
        Self::new(Action::Defend, None, reasoning)
    }
}

/// A validated decision, ready for resolution.
///
/// `target` is `Some` exactly when [`Action::requires_target`] holds, and
/// it always names an active agent other than the actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The action to resolve.
    pub action: Action,
    /// The target of the action.
    pub target: Option<AgentId>,
    /// Reasoning carried through to the log.
    pub reasoning: String,
}

impl Decision {
    /// A stand-down with the given reasoning.
    pub fn defend(reasoning: impl Into<String>) -> Self {
        Self {
            action: Action::Defend,
            target: None,
            reasoning: reasoning.into(),
        }
    }

    /// A targeted action with the given reasoning.
    pub fn targeted(action: Action, target: AgentId, reasoning: impl Into<String>) -> Self {
        Self {
            action,
            target: Some(target),
            reasoning: reasoning.into(),
        }
    }
}
