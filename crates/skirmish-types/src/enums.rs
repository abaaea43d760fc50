//! Enumeration types for the Skirmish engine.
//!
//! Wire names are `snake_case` so that decision batches and change
//! summaries read the same in JSON as they do in the design notes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Relationship
// ---------------------------------------------------------------------------

/// The stored relationship between an unordered pair of agents.
///
/// Pairs that have never interacted are [`Relationship::Neutral`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Relationship {
    /// No standing relationship.
    #[default]
    Neutral,
    /// One side has asked for an alliance. The engine never writes this
    /// value itself; it may be present in externally constructed state.
    WantingAlliance,
    /// Both agents are allied. Blocks battle unconditionally.
    Alliance,
    /// The agents are at war.
    Battle,
}

// ---------------------------------------------------------------------------
// Interaction intent
// ---------------------------------------------------------------------------

/// What an agent intends to do with the agent named in its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Interaction {
    /// Propose an alliance. Requires reciprocity and proximity.
    Alliance,
    /// Attack. Requires only proximity and no existing alliance.
    Battle,
    /// Do nothing with anyone this tick.
    Ignore,
}

impl Interaction {
    /// The relationship this interaction tries to establish, if any.
    pub const fn target_relationship(self) -> Option<Relationship> {
        match self {
            Self::Alliance => Some(Relationship::Alliance),
            Self::Battle => Some(Relationship::Battle),
            Self::Ignore => None,
        }
    }

    /// Whether the interaction needs a counter-party.
    pub const fn requires_counterparty(self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

// ---------------------------------------------------------------------------
// Change summary kinds
// ---------------------------------------------------------------------------

/// The kind of interaction recorded in a change summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum InteractionKind {
    /// An alliance was established this tick.
    Allied,
    /// An agent asked for an alliance that was not (yet) reciprocated.
    WantingAlliance,
    /// A battle relationship was entered this tick.
    Battle,
}

// ---------------------------------------------------------------------------
// Battle
// ---------------------------------------------------------------------------

/// Which of the two sides passed to the battle resolver won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BattleWinner {
    /// The first side argument.
    SideA,
    /// The second side argument.
    SideB,
}
