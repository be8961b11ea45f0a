//! Round resolution and orchestration for the Standoff simulation.
//!
//! This crate owns the rules of the contest: how a batch of independently
//! produced decisions becomes the next game state, when stability events
//! fire, who is eliminated, and when the game is over.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `standoff-config.yaml`.
//! - [`setup`] -- Building the opening state from a roster.
//! - [`decision`] -- [`DecisionProvider`] trait, concurrent gathering, and
//!   [`StandDownProvider`].
//! - [`lockin`] -- Threat lock-in overrides.
//! - [`normalize`] -- Degrading unusable decisions to stand-downs.
//! - [`covert`] -- The covert coin.
//! - [`resolution`] -- Per-action effects and the simultaneous merge.
//! - [`stability`] -- Collapse and dividend events.
//! - [`outcome`] -- Eliminations and termination.
//! - [`round`] -- One round, end to end.
//! - [`runner`] -- The game loop.
//!
//! [`DecisionProvider`]: decision::DecisionProvider
//! [`StandDownProvider`]: decision::StandDownProvider

pub mod config;
pub mod covert;
pub mod decision;
pub mod lockin;
pub mod normalize;
pub mod outcome;
pub mod resolution;
pub mod round;
pub mod runner;
pub mod setup;
pub mod stability;

pub use covert::{CovertRoll, FixedCovert, SeededCovert};
pub use decision::{DecisionProvider, ProviderError, StandDownProvider, gather_decisions};
pub use round::{resolve_decisions, resolve_round};
pub use runner::{GameResult, NoOpCallback, RoundCallback, log_game_end, run_game};
pub use setup::{SetupError, initialize};
