//! Independent re-derivation of a claimed transition.
//!
//! A verifier holding the previous snapshot and the decision batch can
//! recompute the tick and compare it with what a peer claims the result was.
//! The first disagreement found is reported, checked in a fixed order:
//! agent set, positions, relationships, then the change summary.

use std::collections::BTreeSet;

use skirmish_types::{
    AgentId, AgentPair, DecisionBatch, Position, Relationship, TransitionOutcome, WorldSnapshot,
};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::TransitionError;
use crate::transition::apply_transition;

/// Why a claimed transition does not match the re-derived one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The inputs themselves do not produce a valid transition.
    #[error("transition could not be re-derived: {source}")]
    Transition {
        /// The underlying transition failure.
        #[from]
        source: TransitionError,
    },

    /// An agent is present in one snapshot but not the other.
    #[error("agent {agent_id} is in only one snapshot (in claim: {claimed_present})")]
    AgentSetMismatch {
        /// The agent present on only one side.
        agent_id: AgentId,
        /// Whether the claimed snapshot is the one that has it.
        claimed_present: bool,
    },

    /// An agent's position differs.
    #[error("position of {agent_id} differs: claimed {claimed}, derived {derived}")]
    PositionMismatch {
        /// The agent whose position differs.
        agent_id: AgentId,
        /// Position in the claimed snapshot.
        claimed: Position,
        /// Position in the re-derived snapshot.
        derived: Position,
    },

    /// A pair's relationship differs.
    #[error("relationship {pair} differs: claimed {claimed:?}, derived {derived:?}")]
    RelationshipMismatch {
        /// The pair whose relationship differs.
        pair: AgentPair,
        /// Relationship in the claimed snapshot.
        claimed: Relationship,
        /// Relationship in the re-derived snapshot.
        derived: Relationship,
    },

    /// The snapshots agree on every checked field but are not equal.
    #[error("snapshot differs from the re-derived snapshot")]
    SnapshotMismatch,

    /// The snapshots agree but the change summaries do not.
    #[error("change summary differs from the re-derived summary")]
    SummaryMismatch,
}

/// Re-derive the transition from `previous` and `decisions`, then check that
/// `claimed` matches it exactly.
///
/// # Errors
///
/// Returns [`VerificationError::Transition`] if the inputs are invalid, or a
/// mismatch variant describing the first difference found.
pub fn verify_transition(
    config: &EngineConfig,
    previous: &WorldSnapshot,
    decisions: &DecisionBatch,
    claimed: &TransitionOutcome,
) -> Result<(), VerificationError> {
    let derived = apply_transition(config, previous, decisions)?;

    if let Err(mismatch) = compare(&claimed.snapshot, &derived.snapshot) {
        warn!(%mismatch, "Claimed snapshot rejected");
        return Err(mismatch);
    }
    if claimed.summary != derived.summary {
        warn!("Claimed change summary rejected");
        return Err(VerificationError::SummaryMismatch);
    }

    info!(agents = derived.snapshot.agents.len(), "Claimed transition verified");
    Ok(())
}

/// First difference between two snapshots, if any.
fn compare(claimed: &WorldSnapshot, derived: &WorldSnapshot) -> Result<(), VerificationError> {
    let agent_ids: BTreeSet<&AgentId> = claimed.agents.keys().chain(derived.agents.keys()).collect();
    for agent_id in agent_ids {
        match (claimed.position_of(agent_id), derived.position_of(agent_id)) {
            (Some(claimed_pos), Some(derived_pos)) if claimed_pos != derived_pos => {
                return Err(VerificationError::PositionMismatch {
                    agent_id: agent_id.clone(),
                    claimed: claimed_pos,
                    derived: derived_pos,
                });
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(VerificationError::AgentSetMismatch {
                    agent_id: agent_id.clone(),
                    claimed_present: claimed.contains(agent_id),
                });
            }
            _ => {}
        }
    }

    let pairs: BTreeSet<&AgentPair> = claimed
        .relationships
        .iter()
        .chain(derived.relationships.iter())
        .map(|(pair, _)| pair)
        .collect();
    for pair in pairs {
        let claimed_rel = claimed.relationships.get_pair(pair);
        let derived_rel = derived.relationships.get_pair(pair);
        if claimed_rel != derived_rel {
            return Err(VerificationError::RelationshipMismatch {
                pair: pair.clone(),
                claimed: claimed_rel,
                derived: derived_rel,
            });
        }
    }

    if claimed != derived {
        return Err(VerificationError::SnapshotMismatch);
    }
    Ok(())
}
