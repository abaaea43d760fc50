//! Error types for the skirmish-core crate.
//!
//! Every failure aborts the whole call. A failed transition leaves the
//! caller's input snapshot untouched, so the last known-good state is
//! always the one it already holds.

use skirmish_types::{AgentId, Position, SnapshotError};

use crate::geometry::MoveRejection;

/// Errors that abort a tick transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The input snapshot is internally inconsistent.
    #[error("invalid snapshot: {source}")]
    InvalidSnapshot {
        /// The underlying consistency failure.
        #[from]
        source: SnapshotError,
    },

    /// An agent in the snapshot has no decision for this tick.
    #[error("no decision submitted for agent {0}")]
    MissingDecision(AgentId),

    /// The batch carries a decision for an agent not in the snapshot.
    #[error("decision submitted for unknown agent {0}")]
    UnknownAgent(AgentId),

    /// An alliance or battle was declared without a usable counter-party.
    #[error("{agent_id} specified an invalid target agent: {target:?}")]
    InvalidTarget {
        /// The declaring agent.
        agent_id: AgentId,
        /// The named counter-party, if any.
        target: Option<AgentId>,
    },

    /// A move failed a geometry check under
    /// [`MovementPolicy::Reject`](crate::config::MovementPolicy::Reject).
    #[error("{agent_id} cannot move from {from} to {to}: {reason}")]
    InvalidMovement {
        /// The moving agent.
        agent_id: AgentId,
        /// Position before the move.
        from: Position,
        /// Requested position.
        to: Position,
        /// Which check failed.
        reason: MoveRejection,
    },
}

/// Errors raised by the battle outcome resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    /// Both sides have zero total strength, so no win probability exists.
    #[error("degenerate battle: both sides have zero total balance")]
    DegenerateBattle,

    /// A combatant carries a negative balance.
    #[error("combatant {agent_id} has negative balance {balance}")]
    NegativeBalance {
        /// The offending combatant.
        agent_id: AgentId,
        /// Its balance, rendered for display.
        balance: String,
    },

    /// The same agent appears on both sides.
    #[error("agent {agent_id} fights on both sides")]
    OverlappingSides {
        /// The duplicated agent.
        agent_id: AgentId,
    },

    /// The configured casualty probability is not in `[0, 1]`.
    #[error("casualty probability {value} is not in [0, 1]")]
    InvalidCasualtyProbability {
        /// The configured value, rendered for display.
        value: String,
    },

    /// A balance sum or ratio overflowed.
    #[error("arithmetic overflow in battle computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
