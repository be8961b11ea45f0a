//! Shared type definitions for the Standoff simulation.
//!
//! This crate is the single source of truth for the values that flow
//! between the round engine, the decision providers, and the engine
//! binary. It holds data only; every rule lives in `standoff-core`.
//!
//! # Modules
//!
//! - [`ids`] -- Agent handles and run identifiers
//! - [`enums`] -- Actions, termination reasons, log subjects
//! - [`rules`] -- The ruleset carried by every game state
//! - [`decision`] -- Raw and validated decisions
//! - [`structs`] -- Agents, log entries, and the game state

pub mod decision;
pub mod enums;
pub mod ids;
pub mod rules;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use decision::{Decision, RawDecision};
pub use enums::{Action, EVENT_SENTINEL, LogSubject, Termination, UnknownAction};
pub use ids::{AgentId, GameId};
pub use rules::{
    ActionTable, CovertEffects, DefendEffects, DestroyEffects, InvalidRules, PressureEffects,
    RulesConfig, StrikeEffects,
};
pub use structs::{Agent, AgentProfile, GameState, LogEntry};
