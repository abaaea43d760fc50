//! Deterministic tick transitions and battle outcomes for Skirmish.
//!
//! A tick takes the current [`WorldSnapshot`](skirmish_types::WorldSnapshot)
//! and one decision per agent, applies movement and interactions agent by
//! agent in ascending id order, and returns the next snapshot with a summary
//! of what changed. The transition is pure: no clock, no randomness, no I/O.
//! Battle outcomes are resolved separately with an injected random source.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `skirmish-config.yaml` into
//!   strongly-typed structs.
//! - [`geometry`] -- Map bounds, single-step moves, interaction range.
//! - [`relationship`] -- Per-tick alliance and battle resolution.
//! - [`transition`] -- [`apply_transition`], the tick transition itself.
//! - [`battle`] -- [`resolve_battle`], strength-weighted battle outcomes.
//! - [`verify`] -- [`verify_transition`], re-derivation of a claimed tick.
//! - [`error`] -- [`TransitionError`] and [`BattleError`].

pub mod battle;
pub mod config;
pub mod error;
pub mod geometry;
pub mod relationship;
pub mod transition;
pub mod verify;

pub use battle::resolve_battle;
pub use config::{ConfigError, EngineConfig};
pub use error::{BattleError, TransitionError};
pub use transition::apply_transition;
pub use verify::{VerificationError, verify_transition};
