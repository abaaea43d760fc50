//! Error types for malformed world data.
//!
//! These are raised while loading or checking snapshots, before the engine
//! runs. They never occur for snapshots the engine itself produced.

use crate::enums::Relationship;
use crate::ids::AgentId;
use crate::relationship::AgentPair;

/// Errors raised when building a [`RelationshipMatrix`] from raw entries.
///
/// [`RelationshipMatrix`]: crate::relationship::RelationshipMatrix
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    /// An entry names the same agent on both ends.
    #[error("relationship entry pairs agent {0} with itself")]
    SelfRelationship(AgentId),

    /// Two entries for the same pair disagree. This is how directed
    /// per-agent data that drifted out of lockstep surfaces.
    #[error("contradictory relationships for {pair}: {first:?} and {second:?}")]
    Conflicting {
        /// The pair with more than one value.
        pair: AgentPair,
        /// The value seen first.
        first: Relationship,
        /// The value that contradicted it.
        second: Relationship,
    },
}

/// Errors raised by [`WorldSnapshot::validate`].
///
/// [`WorldSnapshot::validate`]: crate::structs::WorldSnapshot::validate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// An agent is stored under a key that is not its own id.
    #[error("agent {agent_id} stored under key {key}")]
    KeyMismatch {
        /// The map key.
        key: AgentId,
        /// The id carried by the agent value.
        agent_id: AgentId,
    },

    /// A relationship names an agent that is not in the snapshot.
    #[error("relationship {pair} references unknown agent {agent_id}")]
    UnknownRelationshipAgent {
        /// The offending pair.
        pair: AgentPair,
        /// The agent missing from the snapshot.
        agent_id: AgentId,
    },
}
