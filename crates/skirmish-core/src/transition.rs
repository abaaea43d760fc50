//! The tick transition: one snapshot plus one decision batch in, the next
//! snapshot plus a change summary out.
//!
//! Agents are processed one at a time in ascending id order. For each agent
//! the movement phase runs first, then the interaction phase, both against a
//! single working copy of the snapshot. The input snapshot is never mutated.
//!
//! # Determinism
//!
//! The transition draws no randomness and reads no clock. Identical inputs
//! produce byte-identical serialized outputs.

use skirmish_types::{
    AgentId, ChangeSummary, Decision, DecisionBatch, MovementRecord, TransitionOutcome,
    WorldSnapshot,
};
use tracing::{debug, info};

use crate::config::{EngineConfig, MovementPolicy};
use crate::error::TransitionError;
use crate::geometry;
use crate::relationship::RelationshipResolver;

/// Apply one tick of decisions to `current`.
///
/// # Errors
///
/// Returns a [`TransitionError`] if the snapshot is inconsistent, the batch
/// does not cover exactly the snapshot's agents, an alliance or battle names
/// an unusable counter-party, or (under [`MovementPolicy::Reject`]) a move
/// fails a geometry check. On error no partial result is produced.
pub fn apply_transition(
    config: &EngineConfig,
    current: &WorldSnapshot,
    decisions: &DecisionBatch,
) -> Result<TransitionOutcome, TransitionError> {
    current.validate()?;
    validate_batch(current, decisions)?;

    let mut next = current.clone();
    let mut summary = ChangeSummary::default();
    let resolver = RelationshipResolver::new(config, current, decisions);

    for agent_id in current.agents.keys() {
        let decision = decisions
            .get(agent_id)
            .ok_or_else(|| TransitionError::MissingDecision(agent_id.clone()))?;

        // Phase 1: movement
        if let Some(record) = apply_movement(config, &mut next, agent_id, decision)? {
            summary.movements.push(record);
        }

        // Phase 2: interaction
        if let (Some(interaction), Some(counterparty)) =
            (decision.interaction, decision.with_agent.as_ref())
        {
            if let Some(record) = resolver.resolve(&mut next, agent_id, interaction, counterparty)? {
                summary.interactions.push(record);
            }
        }
    }

    info!(
        agents = next.agents.len(),
        movements = summary.movements.len(),
        interactions = summary.interactions.len(),
        "Transition applied"
    );

    Ok(TransitionOutcome {
        snapshot: next,
        summary,
    })
}

/// Check that the batch covers exactly the snapshot's agents and that every
/// alliance or battle names a distinct agent present in the snapshot.
fn validate_batch(snapshot: &WorldSnapshot, decisions: &DecisionBatch) -> Result<(), TransitionError> {
    for agent_id in snapshot.agents.keys() {
        if !decisions.contains_key(agent_id) {
            return Err(TransitionError::MissingDecision(agent_id.clone()));
        }
    }

    for (agent_id, decision) in decisions {
        if !snapshot.contains(agent_id) {
            return Err(TransitionError::UnknownAgent(agent_id.clone()));
        }

        let Some(interaction) = decision.interaction else {
            continue;
        };
        if !interaction.requires_counterparty() {
            continue;
        }

        match &decision.with_agent {
            Some(target) if target != agent_id && snapshot.contains(target) => {}
            other => {
                return Err(TransitionError::InvalidTarget {
                    agent_id: agent_id.clone(),
                    target: other.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Movement phase for one agent. Returns a record only if the agent's
/// position actually changed.
fn apply_movement(
    config: &EngineConfig,
    working: &mut WorldSnapshot,
    agent_id: &AgentId,
    decision: &Decision,
) -> Result<Option<MovementRecord>, TransitionError> {
    let Some(target) = decision.target_position else {
        return Ok(None);
    };
    let agent = working
        .agents
        .get_mut(agent_id)
        .ok_or_else(|| TransitionError::UnknownAgent(agent_id.clone()))?;
    let from = agent.position;

    match geometry::check_move(config.map.radius, from, target) {
        Ok(()) if target == from => Ok(None),
        Ok(()) => {
            agent.position = target;
            debug!(%agent_id, %from, to = %target, "Agent moved");
            Ok(Some(MovementRecord {
                agent: agent_id.clone(),
                from_position: from,
                to_position: target,
            }))
        }
        Err(reason) => match config.interaction.invalid_movement {
            MovementPolicy::Ignore => {
                debug!(%agent_id, %from, to = %target, %reason, "Movement ignored");
                Ok(None)
            }
            MovementPolicy::Reject => Err(TransitionError::InvalidMovement {
                agent_id: agent_id.clone(),
                from,
                to: target,
                reason,
            }),
        },
    }
}
