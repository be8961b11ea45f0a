//! Rule constants carried by every game state.
//!
//! A [`RulesConfig`] is fixed when a game is initialized and shared
//! read-only by every state the game produces. Loading and validating it
//! from YAML lives in `standoff-core::config`; this module only defines the
//! shape and the defaults.

use serde::{Deserialize, Serialize};

/// The complete ruleset for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Resources every agent starts with.
    pub initial_resources: i64,
    /// Round budget. The game ends after this round resolves.
    pub max_rounds: u32,
    /// Stability at the start of the game.
    pub stability_start: u32,
    /// Upper bound of the stability meter; reaching it fires the dividend.
    pub stability_max: u32,
    /// Threat score at which an agent is locked into pressuring an opponent.
    pub lock_threshold: u32,
    /// Agents at or below this many resources are eliminated.
    pub elimination_floor: i64,
    /// Resources every active agent loses when stability collapses.
    pub collapse_penalty: i64,
    /// Stability value restored after a collapse.
    pub collapse_recovery: u32,
    /// Resources every active agent gains from the dividend.
    pub dividend_bonus: i64,
    /// Amount subtracted from every threat score by the dividend.
    pub dividend_threat_relief: u32,
    /// Minimum number of simultaneous stand-downs that earns the group bonus.
    pub group_defend_threshold: usize,
    /// Stability added once when the group threshold is met.
    pub group_defend_bonus: i64,
    /// Whether a pressured or struck target reacts harder than a bystander.
    pub target_reaction_enabled: bool,
    /// Per-agent decision deadline in milliseconds (0 = wait indefinitely).
    pub decision_timeout_ms: u64,
    /// Per-action effect magnitudes.
    pub actions: ActionTable,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            initial_resources: 20,
            max_rounds: 50,
            stability_start: 10,
            stability_max: 20,
            lock_threshold: 5,
            elimination_floor: -20,
            collapse_penalty: 5,
            collapse_recovery: 5,
            dividend_bonus: 4,
            dividend_threat_relief: 2,
            group_defend_threshold: 3,
            group_defend_bonus: 3,
            target_reaction_enabled: true,
            decision_timeout_ms: 0,
            actions: ActionTable::default(),
        }
    }
}

impl RulesConfig {
    /// Check the ruleset for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidRules`] violation found.
    pub const fn validate(&self) -> Result<(), InvalidRules> {
        if self.stability_max == 0 {
            return Err(InvalidRules::ZeroStabilityMax);
        }
        if self.stability_start > self.stability_max {
            return Err(InvalidRules::StabilityStartAboveMax {
                start: self.stability_start,
                max: self.stability_max,
            });
        }
        if self.collapse_recovery > self.stability_max {
            return Err(InvalidRules::RecoveryAboveMax {
                recovery: self.collapse_recovery,
                max: self.stability_max,
            });
        }
        if self.max_rounds == 0 {
            return Err(InvalidRules::ZeroRounds);
        }
        if self.actions.covert.trace_chance_pct > 100 {
            return Err(InvalidRules::TraceChanceOutOfRange(
                self.actions.covert.trace_chance_pct,
            ));
        }
        Ok(())
    }
}

/// A ruleset value the engine refuses to run with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRules {
    /// The stability meter has no range.
    #[error("stability_max must be greater than zero")]
    ZeroStabilityMax,

    /// The game would start outside the stability range.
    #[error("stability_start ({start}) exceeds stability_max ({max})")]
    StabilityStartAboveMax {
        /// Configured start value.
        start: u32,
        /// Configured maximum.
        max: u32,
    },

    /// A collapse would reset stability outside its range.
    #[error("collapse_recovery ({recovery}) exceeds stability_max ({max})")]
    RecoveryAboveMax {
        /// Configured recovery value.
        recovery: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The game would have no rounds.
    #[error("max_rounds must be at least 1")]
    ZeroRounds,

    /// The covert trace chance is not a percentage.
    #[error("covert trace chance {0}% is not within 0..=100")]
    TraceChanceOutOfRange(u32),
}

/// Effect magnitudes for every action.
///
/// Signs are applied by the resolver: costs and losses are stored as
/// positive numbers and subtracted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTable {
    /// Stand-down effects.
    pub defend: DefendEffects,
    /// Posture effects.
    pub pressure: PressureEffects,
    /// Strike effects.
    pub strike: StrikeEffects,
    /// Launch effects.
    pub destroy: DestroyEffects,
    /// Backdoor effects.
    pub covert: CovertEffects,
}

/// Effects of [`Action::Defend`](crate::Action::Defend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefendEffects {
    /// Resources the actor pays.
    pub actor_cost: i64,
    /// Stability gained.
    pub stability_gain: i64,
    /// Threat every observer sheds toward the actor.
    pub threat_relief: i64,
}

impl Default for DefendEffects {
    fn default() -> Self {
        Self {
            actor_cost: 1,
            stability_gain: 1,
            threat_relief: 1,
        }
    }
}

/// Effects of [`Action::Pressure`](crate::Action::Pressure).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureEffects {
    /// Resources the target loses.
    pub target_loss: i64,
    /// Threat every observer gains toward the actor.
    pub observer_threat: i64,
    /// Additional threat the target gains toward the actor.
    pub target_reaction: i64,
}

impl Default for PressureEffects {
    fn default() -> Self {
        Self {
            target_loss: 1,
            observer_threat: 1,
            target_reaction: 1,
        }
    }
}

/// Effects of [`Action::Strike`](crate::Action::Strike).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeEffects {
    /// Resources the actor seizes.
    pub actor_gain: i64,
    /// Resources the target loses.
    pub target_loss: i64,
    /// Stability lost.
    pub stability_loss: i64,
    /// Threat every observer gains toward the actor.
    pub observer_threat: i64,
    /// Additional threat the target gains toward the actor.
    pub target_reaction: i64,
}

impl Default for StrikeEffects {
    fn default() -> Self {
        Self {
            actor_gain: 3,
            target_loss: 4,
            stability_loss: 2,
            observer_threat: 2,
            target_reaction: 2,
        }
    }
}

/// Effects of [`Action::Destroy`](crate::Action::Destroy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestroyEffects {
    /// Stability lost.
    pub stability_loss: i64,
    /// Threat every observer gains toward the actor.
    pub observer_threat: i64,
}

impl Default for DestroyEffects {
    fn default() -> Self {
        Self {
            stability_loss: 2,
            observer_threat: 5,
        }
    }
}

/// Effects of [`Action::Covert`](crate::Action::Covert).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CovertEffects {
    /// Chance, in percent, that the intrusion is traced.
    pub trace_chance_pct: u32,
    /// Stability lost whatever the outcome.
    pub stability_loss: i64,
    /// Threat every observer gains toward a traced actor.
    pub traced_observer_threat: i64,
    /// Resources the target loses on an untraced intrusion.
    pub target_loss: i64,
    /// Threat the target gains toward each bystander on an untraced intrusion.
    pub paranoia: i64,
}

impl Default for CovertEffects {
    fn default() -> Self {
        Self {
            trace_chance_pct: 50,
            stability_loss: 1,
            traced_observer_threat: 3,
            target_loss: 3,
            paranoia: 1,
        }
    }
}
