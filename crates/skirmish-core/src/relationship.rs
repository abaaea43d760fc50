//! Relationship resolution for a single tick.
//!
//! Given one agent's declared interaction, decides whether an alliance
//! forms, an alliance request is recorded, or a battle begins. The resolver
//! is driven by the transition engine, once per agent, in processing order.
//!
//! # Rules
//!
//! - A pair already holding the interaction's end state is skipped.
//! - **Alliance** needs the counter-party's decision to name the actor with
//!   `alliance`, both agents within interaction range, and the
//!   counter-party's own requested move (if any) to pass the map and step
//!   checks from where it started the tick. Anything less records
//!   `wanting_alliance` without touching the stored relationship.
//! - **Battle** needs only range. An existing alliance blocks it.
//!
//! # Positions
//!
//! Range is measured between where both agents end the tick. The actor has
//! already moved. The counter-party is placed at its requested target if
//! that move is valid, else where it started, whether or not it has been
//! processed yet.
//!
//! # Ordering
//!
//! When both agents name each other with different intents, whichever is
//! processed first wins. A pair changes state at most once per tick: each
//! agent holds one decision, and a transition leaves the pair in the end
//! state of the other agent's matching intent, which is then skipped.

use skirmish_types::{
    AgentId, AgentPair, DecisionBatch, Interaction, InteractionKind, InteractionRecord, Position,
    Relationship, WorldSnapshot,
};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::TransitionError;
use crate::geometry;

/// Per-tick relationship resolver.
///
/// Holds read-only views of the engine config and the tick's input snapshot
/// and decision batch.
#[derive(Debug)]
pub struct RelationshipResolver<'a> {
    config: &'a EngineConfig,
    input: &'a WorldSnapshot,
    decisions: &'a DecisionBatch,
}

impl<'a> RelationshipResolver<'a> {
    /// Create a resolver for one tick.
    pub const fn new(
        config: &'a EngineConfig,
        input: &'a WorldSnapshot,
        decisions: &'a DecisionBatch,
    ) -> Self {
        Self {
            config,
            input,
            decisions,
        }
    }

    /// Resolve `actor`'s interaction with `counterparty` against the working
    /// snapshot, mutating its relationship matrix if a transition happens.
    ///
    /// Returns the record to append to the change summary, if any.
    pub fn resolve(
        &self,
        working: &mut WorldSnapshot,
        actor: &AgentId,
        interaction: Interaction,
        counterparty: &AgentId,
    ) -> Result<Option<InteractionRecord>, TransitionError> {
        let Some(target) = interaction.target_relationship() else {
            return Ok(None);
        };

        let pair = AgentPair::of(actor, counterparty).ok_or_else(|| {
            TransitionError::InvalidTarget {
                agent_id: actor.clone(),
                target: Some(counterparty.clone()),
            }
        })?;

        let current = working.relationships.get_pair(&pair);
        if current == target {
            debug!(%actor, %counterparty, ?current, "Interaction skipped: already in target state");
            return Ok(None);
        }

        let actor_pos = working
            .position_of(actor)
            .ok_or_else(|| TransitionError::UnknownAgent(actor.clone()))?;
        let counter_start = self
            .input
            .position_of(counterparty)
            .ok_or_else(|| TransitionError::UnknownAgent(counterparty.clone()))?;
        let counter_end = self.destination(counterparty, counter_start);
        let counter_pos = counter_end.unwrap_or(counter_start);
        let in_range = geometry::is_within_interaction_range(
            actor_pos,
            counter_pos,
            self.config.interaction.range,
        );

        let record = match interaction {
            Interaction::Alliance => self.resolve_alliance(
                working,
                pair,
                actor,
                counterparty,
                in_range,
                counter_end.is_some(),
            ),
            Interaction::Battle => {
                Self::resolve_battle(working, pair, current, actor, counterparty, in_range)
            }
            Interaction::Ignore => None,
        };
        Ok(record)
    }

    /// Alliance path: mutual consent, range, and a valid counter-party move.
    fn resolve_alliance(
        &self,
        working: &mut WorldSnapshot,
        pair: AgentPair,
        actor: &AgentId,
        counterparty: &AgentId,
        in_range: bool,
        counter_move_valid: bool,
    ) -> Option<InteractionRecord> {
        let reciprocated = self.decisions.get(counterparty).is_some_and(|decision| {
            decision.interaction == Some(Interaction::Alliance)
                && decision.with_agent.as_ref() == Some(actor)
        });

        if reciprocated && in_range && counter_move_valid {
            working.relationships.set(pair, Relationship::Alliance);
            debug!(%actor, %counterparty, "Alliance formed");
            return Some(InteractionRecord::between(
                actor,
                counterparty,
                InteractionKind::Allied,
            ));
        }

        debug!(
            %actor,
            %counterparty,
            reciprocated,
            in_range,
            counter_move_valid,
            "Alliance requested"
        );
        Some(InteractionRecord::between(
            actor,
            counterparty,
            InteractionKind::WantingAlliance,
        ))
    }

    /// Battle path: range only, blocked by alliance.
    fn resolve_battle(
        working: &mut WorldSnapshot,
        pair: AgentPair,
        current: Relationship,
        actor: &AgentId,
        counterparty: &AgentId,
        in_range: bool,
    ) -> Option<InteractionRecord> {
        if current == Relationship::Alliance {
            debug!(%actor, %counterparty, "Battle blocked by alliance");
            return None;
        }
        if !in_range {
            debug!(%actor, %counterparty, "Battle target out of range");
            return None;
        }

        working.relationships.set(pair, Relationship::Battle);
        debug!(%actor, %counterparty, previous = ?current, "Battle started");
        Some(InteractionRecord::between(
            actor,
            counterparty,
            InteractionKind::Battle,
        ))
    }

    /// Where `agent` ends the tick if it starts at `start`: its requested
    /// target when that move passes the map and step checks, `start` when it
    /// requests none, and `None` when the requested move is invalid.
    fn destination(&self, agent: &AgentId, start: Position) -> Option<Position> {
        let target = self
            .decisions
            .get(agent)
            .and_then(|decision| decision.target_position);
        target.map_or(Some(start), |target| {
            geometry::check_move(self.config.map.radius, start, target)
                .ok()
                .map(|()| target)
        })
    }
}
