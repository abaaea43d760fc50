//! Core entity structs for the Skirmish engine.
//!
//! World state ([`WorldSnapshot`]), per-tick input ([`Decision`]), per-tick
//! output ([`ChangeSummary`], [`TransitionOutcome`]), and the battle types
//! consumed and produced by the outcome resolver.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BattleWinner, Interaction, InteractionKind, Relationship};
use crate::error::SnapshotError;
use crate::ids::AgentId;
use crate::relationship::{RelationshipEntry, RelationshipMatrix};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point on the integer map plane. The map is centred on the origin.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Position {
    /// The map centre.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a position from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// An agent as stored in a world snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Agent {
    /// Stable identifier.
    pub id: AgentId,
    /// Current position on the map.
    pub position: Position,
}

impl Agent {
    /// Create an agent at `position`.
    pub const fn new(id: AgentId, position: Position) -> Self {
        Self { id, position }
    }
}

// ---------------------------------------------------------------------------
// WorldSnapshot
// ---------------------------------------------------------------------------

/// Complete world state at a tick boundary.
///
/// Snapshots are values: the engine reads one and returns a new one, and
/// never mutates the snapshot it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Every agent, keyed by id. Iteration order is the processing order.
    pub agents: BTreeMap<AgentId, Agent>,
    /// Relationships between agent pairs. Absent pairs are neutral.
    #[serde(default)]
    #[ts(as = "Vec<RelationshipEntry>")]
    pub relationships: RelationshipMatrix,
}

impl WorldSnapshot {
    /// Build a snapshot with the given agents and no relationships.
    pub fn from_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        Self {
            agents: agents
                .into_iter()
                .map(|agent| (agent.id.clone(), agent))
                .collect(),
            relationships: RelationshipMatrix::new(),
        }
    }

    /// Look up an agent.
    pub fn agent(&self, agent_id: &AgentId) -> Option<&Agent> {
        self.agents.get(agent_id)
    }

    /// Position of an agent, if present.
    pub fn position_of(&self, agent_id: &AgentId) -> Option<Position> {
        self.agents.get(agent_id).map(|agent| agent.position)
    }

    /// Relationship between two agents.
    pub fn relationship(&self, a: &AgentId, b: &AgentId) -> Relationship {
        self.relationships.get(a, b)
    }

    /// Whether an agent with this id exists.
    pub fn contains(&self, agent_id: &AgentId) -> bool {
        self.agents.contains_key(agent_id)
    }

    /// Check that the snapshot is internally consistent.
    ///
    /// - every agent is stored under its own id
    /// - every relationship entry names two agents present in the snapshot
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for (key, agent) in &self.agents {
            if *key != agent.id {
                return Err(SnapshotError::KeyMismatch {
                    key: key.clone(),
                    agent_id: agent.id.clone(),
                });
            }
        }

        for (pair, _) in self.relationships.iter() {
            for agent_id in [pair.first(), pair.second()] {
                if !self.agents.contains_key(agent_id) {
                    return Err(SnapshotError::UnknownRelationshipAgent {
                        pair: pair.clone(),
                        agent_id: agent_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// One agent's decision for a single tick.
///
/// An absent `target_position` means "stay". `with_agent` is only consulted
/// when `interaction` is [`Interaction::Alliance`] or [`Interaction::Battle`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct Decision {
    /// Where the agent wants to be after this tick.
    pub target_position: Option<Position>,
    /// What the agent wants to do with `with_agent`.
    pub interaction: Option<Interaction>,
    /// The counter-party of the interaction.
    pub with_agent: Option<AgentId>,
}

impl Decision {
    /// A no-op decision: stay put, ignore everyone.
    pub const fn idle() -> Self {
        Self {
            target_position: None,
            interaction: Some(Interaction::Ignore),
            with_agent: None,
        }
    }

    /// Request a move to `target`.
    #[must_use]
    pub fn moving_to(mut self, target: Position) -> Self {
        self.target_position = Some(target);
        self
    }

    /// Declare an interaction with `counterparty`.
    #[must_use]
    pub fn interacting(mut self, interaction: Interaction, counterparty: impl Into<AgentId>) -> Self {
        self.interaction = Some(interaction);
        self.with_agent = Some(counterparty.into());
        self
    }
}

/// Every agent's decision for one tick, keyed by agent id.
pub type DecisionBatch = BTreeMap<AgentId, Decision>;

// ---------------------------------------------------------------------------
// ChangeSummary
// ---------------------------------------------------------------------------

/// An accepted movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MovementRecord {
    /// The agent that moved.
    pub agent: AgentId,
    /// Position before the move.
    pub from_position: Position,
    /// Position after the move.
    pub to_position: Position,
}

/// A resolved (or requested) interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InteractionRecord {
    /// The acting agent first, then its counter-party.
    pub agents: Vec<AgentId>,
    /// What happened.
    #[serde(rename = "type")]
    pub kind: InteractionKind,
}

impl InteractionRecord {
    /// Record `kind` between `actor` and `counterparty`.
    pub fn between(actor: &AgentId, counterparty: &AgentId, kind: InteractionKind) -> Self {
        Self {
            agents: vec![actor.clone(), counterparty.clone()],
            kind,
        }
    }
}

/// What happened during one tick, in agent processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChangeSummary {
    /// Accepted movements.
    pub movements: Vec<MovementRecord>,
    /// Interactions that changed or were requested.
    pub interactions: Vec<InteractionRecord>,
}

impl ChangeSummary {
    /// Whether nothing happened.
    pub fn is_empty(&self) -> bool {
        self.movements.is_empty() && self.interactions.is_empty()
    }

    /// Interactions of a given kind.
    pub fn interactions_of(&self, kind: InteractionKind) -> impl Iterator<Item = &InteractionRecord> {
        self.interactions.iter().filter(move |record| record.kind == kind)
    }
}

/// The result of applying one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TransitionOutcome {
    /// The next world state.
    pub snapshot: WorldSnapshot,
    /// What changed.
    pub summary: ChangeSummary,
}

// ---------------------------------------------------------------------------
// Battle
// ---------------------------------------------------------------------------

/// An agent fighting on one side of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Combatant {
    /// The fighting agent.
    pub agent_id: AgentId,
    /// Strength contributed to the side total. Must not be negative.
    #[ts(as = "String")]
    pub balance: Decimal,
}

impl Combatant {
    /// Create a combatant.
    pub const fn new(agent_id: AgentId, balance: Decimal) -> Self {
        Self { agent_id, balance }
    }
}

/// One side of a battle, assembled by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BattleSide {
    /// The side's combatants, in the order casualty draws are made.
    pub combatants: Vec<Combatant>,
}

impl BattleSide {
    /// Create a side from its combatants.
    pub const fn new(combatants: Vec<Combatant>) -> Self {
        Self { combatants }
    }

    /// Sum of all balances, or `None` on overflow.
    pub fn total_balance(&self) -> Option<Decimal> {
        self.combatants
            .iter()
            .try_fold(Decimal::ZERO, |sum, c| sum.checked_add(c.balance))
    }

    /// Whether `agent_id` fights on this side.
    pub fn contains(&self, agent_id: &AgentId) -> bool {
        self.combatants.iter().any(|c| c.agent_id == *agent_id)
    }

    /// Number of combatants.
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// Whether the side has no combatants.
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }
}

/// A combatant on the losing side and whether it was killed in action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DefeatedAgent {
    /// The losing combatant, unchanged.
    pub combatant: Combatant,
    /// Whether the casualty draw killed this agent.
    pub killed_in_action: bool,
}

/// The result of resolving a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BattleOutcome {
    /// Which argument won.
    pub winner: BattleWinner,
    /// The winning side, unchanged.
    pub winning_side: BattleSide,
    /// Every member of the losing side, with its casualty flag.
    pub defeated_agents: Vec<DefeatedAgent>,
}

impl BattleOutcome {
    /// Ids of losing combatants killed in action.
    pub fn killed(&self) -> impl Iterator<Item = &AgentId> {
        self.defeated_agents
            .iter()
            .filter(|d| d.killed_in_action)
            .map(|d| &d.combatant.agent_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::relationship::AgentPair;

    use super::*;

    fn id(name: &str) -> AgentId {
        AgentId::from(name)
    }

    fn two_agent_world() -> WorldSnapshot {
        WorldSnapshot::from_agents([
            Agent::new(id("agentA"), Position::new(0, 0)),
            Agent::new(id("agentB"), Position::new(1, 1)),
        ])
    }

    // -----------------------------------------------------------------------
    // WorldSnapshot
    // -----------------------------------------------------------------------

    #[test]
    fn from_agents_keys_by_id() {
        let world = two_agent_world();
        assert_eq!(world.position_of(&id("agentB")), Some(Position::new(1, 1)));
        assert!(world.contains(&id("agentA")));
        assert!(world.validate().is_ok());
    }

    #[test]
    fn validate_catches_key_mismatch() {
        let mut world = two_agent_world();
        world
            .agents
            .insert(id("agentZ"), Agent::new(id("agentC"), Position::ORIGIN));
        assert_eq!(
            world.validate(),
            Err(SnapshotError::KeyMismatch {
                key: id("agentZ"),
                agent_id: id("agentC"),
            })
        );
    }

    #[test]
    fn validate_catches_unknown_relationship_agent() {
        let mut world = two_agent_world();
        let pair = AgentPair::new(id("agentA"), id("agentQ")).unwrap();
        world.relationships.set(pair.clone(), Relationship::Battle);
        assert_eq!(
            world.validate(),
            Err(SnapshotError::UnknownRelationshipAgent {
                pair,
                agent_id: id("agentQ"),
            })
        );
    }

    #[test]
    fn snapshot_json_shape() {
        let mut world = two_agent_world();
        world.relationships.set(
            AgentPair::new(id("agentA"), id("agentB")).unwrap(),
            Relationship::Alliance,
        );
        let json = serde_json::to_value(&world).unwrap();
        assert_eq!(json["agents"]["agentA"]["position"], serde_json::json!({"x": 0, "y": 0}));
        assert_eq!(json["relationships"][0]["relationship"], "alliance");

        let back: WorldSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, world);
    }

    // -----------------------------------------------------------------------
    // Decision
    // -----------------------------------------------------------------------

    #[test]
    fn decision_fields_default_to_none() {
        let decision: Decision = serde_json::from_str("{}").unwrap();
        assert_eq!(decision, Decision::default());

        let decision: Decision =
            serde_json::from_str(r#"{"interaction": "alliance", "with_agent": "agentB"}"#)
                .unwrap();
        assert_eq!(
            decision,
            Decision::default().interacting(Interaction::Alliance, "agentB")
        );
    }

    #[test]
    fn decision_builders_compose() {
        let decision = Decision::idle()
            .moving_to(Position::new(1, 0))
            .interacting(Interaction::Battle, "agentC");
        assert_eq!(decision.target_position, Some(Position::new(1, 0)));
        assert_eq!(decision.interaction, Some(Interaction::Battle));
        assert_eq!(decision.with_agent, Some(id("agentC")));
    }

    // -----------------------------------------------------------------------
    // Summary and battle helpers
    // -----------------------------------------------------------------------

    #[test]
    fn interaction_record_serializes_type_field() {
        let record = InteractionRecord::between(&id("agentA"), &id("agentB"), InteractionKind::Battle);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"agents": ["agentA", "agentB"], "type": "battle"}));
    }

    #[test]
    fn side_totals_and_membership() {
        let side = BattleSide::new(vec![
            Combatant::new(id("agentA"), dec!(10)),
            Combatant::new(id("agentB"), dec!(2.5)),
        ]);
        assert_eq!(side.total_balance(), Some(dec!(12.5)));
        assert!(side.contains(&id("agentB")));
        assert!(!side.contains(&id("agentC")));
        assert_eq!(side.len(), 2);
        assert_eq!(BattleSide::default().total_balance(), Some(Decimal::ZERO));
    }
}
