//! Shared type definitions for the Skirmish tick-transition engine.
//!
//! This crate is the single source of truth for the data exchanged with the
//! engine: world snapshots, decision batches, change summaries, and battle
//! sides. Types flow downstream to `TypeScript` via `ts-rs` for replay
//! tooling and verifiers.
//!
//! # Modules
//!
//! - [`ids`] -- The [`AgentId`] identifier
//! - [`enums`] -- Relationships, interaction intents, summary kinds
//! - [`relationship`] -- Symmetric [`RelationshipMatrix`] keyed by [`AgentPair`]
//! - [`structs`] -- Snapshots, decisions, summaries, battle types
//! - [`error`] -- Errors for malformed snapshot and matrix data

pub mod enums;
pub mod error;
pub mod ids;
pub mod relationship;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BattleWinner, Interaction, InteractionKind, Relationship};
pub use error::{MatrixError, SnapshotError};
pub use ids::AgentId;
pub use relationship::{AgentPair, RelationshipEntry, RelationshipMatrix};
pub use structs::{
    Agent, BattleOutcome, BattleSide, ChangeSummary, Combatant, Decision, DecisionBatch,
    DefeatedAgent, InteractionRecord, MovementRecord, Position, TransitionOutcome, WorldSnapshot,
};
