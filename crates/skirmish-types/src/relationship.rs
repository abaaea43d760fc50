//! Symmetric relationship storage keyed by unordered agent pairs.
//!
//! A relationship between two agents is a single value, not two directed
//! views that have to be kept in lockstep. [`AgentPair`] normalises its two
//! ids so that `(A, B)` and `(B, A)` are the same key, which makes symmetry
//! a structural property of [`RelationshipMatrix`] rather than a rule every
//! writer has to remember.
//!
//! Neutral pairs are never stored. An absent entry reads as
//! [`Relationship::Neutral`], and writing `Neutral` removes the entry, so two
//! matrices describing the same relationships always compare (and
//! serialise) equal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Relationship;
use crate::error::MatrixError;
use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// AgentPair
// ---------------------------------------------------------------------------

/// An unordered pair of two distinct agents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentPair {
    low: AgentId,
    high: AgentId,
}

impl AgentPair {
    /// Build the pair for two agents, in either order.
    ///
    /// Returns `None` when both ids are the same agent.
    pub fn new(a: AgentId, b: AgentId) -> Option<Self> {
        match a.cmp(&b) {
            core::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            core::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// Build the pair from borrowed ids.
    pub fn of(a: &AgentId, b: &AgentId) -> Option<Self> {
        Self::new(a.clone(), b.clone())
    }

    /// The lexicographically smaller id.
    pub const fn first(&self) -> &AgentId {
        &self.low
    }

    /// The lexicographically larger id.
    pub const fn second(&self) -> &AgentId {
        &self.high
    }

    /// Whether `agent_id` is one of the two ends.
    pub fn contains(&self, agent_id: &AgentId) -> bool {
        self.low == *agent_id || self.high == *agent_id
    }

    /// The end that is not `agent_id`, if `agent_id` is part of the pair.
    pub fn other(&self, agent_id: &AgentId) -> Option<&AgentId> {
        if self.low == *agent_id {
            Some(&self.high)
        } else if self.high == *agent_id {
            Some(&self.low)
        } else {
            None
        }
    }

    /// Consume the pair, returning both ids in sorted order.
    pub fn into_agents(self) -> [AgentId; 2] {
        [self.low, self.high]
    }
}

impl core::fmt::Display for AgentPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}<->{}", self.low, self.high)
    }
}

// ---------------------------------------------------------------------------
// RelationshipEntry (wire form)
// ---------------------------------------------------------------------------

/// One serialised matrix entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RelationshipEntry {
    /// The two agents, in any order.
    pub agents: [AgentId; 2],
    /// Their shared relationship.
    pub relationship: Relationship,
}

// ---------------------------------------------------------------------------
// RelationshipMatrix
// ---------------------------------------------------------------------------

/// The relationship table for a world snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "Vec<RelationshipEntry>",
    try_from = "Vec<RelationshipEntry>"
)]
pub struct RelationshipMatrix {
    entries: BTreeMap<AgentPair, Relationship>,
}

impl RelationshipMatrix {
    /// Create an empty matrix in which every pair is neutral.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The relationship between two agents. Self-pairs read as neutral.
    pub fn get(&self, a: &AgentId, b: &AgentId) -> Relationship {
        AgentPair::of(a, b).map_or(Relationship::Neutral, |pair| self.get_pair(&pair))
    }

    /// The relationship stored for `pair`.
    pub fn get_pair(&self, pair: &AgentPair) -> Relationship {
        self.entries
            .get(pair)
            .copied()
            .unwrap_or(Relationship::Neutral)
    }

    /// Set the relationship for `pair`, returning the previous value.
    pub fn set(&mut self, pair: AgentPair, relationship: Relationship) -> Relationship {
        let previous = if relationship == Relationship::Neutral {
            self.entries.remove(&pair)
        } else {
            self.entries.insert(pair, relationship)
        };
        previous.unwrap_or(Relationship::Neutral)
    }

    /// Iterate over every non-neutral pair in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&AgentPair, Relationship)> {
        self.entries.iter().map(|(pair, rel)| (pair, *rel))
    }

    /// Pairs currently holding `relationship`.
    ///
    /// Neutral pairs are not stored, so asking for
    /// [`Relationship::Neutral`] yields nothing.
    pub fn pairs_with(&self, relationship: Relationship) -> impl Iterator<Item = &AgentPair> {
        self.entries
            .iter()
            .filter(move |(_, rel)| **rel == relationship)
            .map(|(pair, _)| pair)
    }

    /// Number of non-neutral pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether every pair is neutral.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<RelationshipMatrix> for Vec<RelationshipEntry> {
    fn from(matrix: RelationshipMatrix) -> Self {
        matrix
            .entries
            .into_iter()
            .map(|(pair, relationship)| RelationshipEntry {
                agents: pair.into_agents(),
                relationship,
            })
            .collect()
    }
}

impl TryFrom<Vec<RelationshipEntry>> for RelationshipMatrix {
    type Error = MatrixError;

    fn try_from(raw: Vec<RelationshipEntry>) -> Result<Self, Self::Error> {
        // Neutral entries are tracked here too so that a neutral/alliance
        // contradiction is still caught before neutral values are dropped.
        let mut seen: BTreeMap<AgentPair, Relationship> = BTreeMap::new();

        for entry in raw {
            let [a, b] = entry.agents;
            let pair = match AgentPair::new(a.clone(), b) {
                Some(pair) => pair,
                None => return Err(MatrixError::SelfRelationship(a)),
            };

            if let Some(&first) = seen.get(&pair) {
                if first != entry.relationship {
                    return Err(MatrixError::Conflicting {
                        pair,
                        first,
                        second: entry.relationship,
                    });
                }
                continue;
            }
            seen.insert(pair, entry.relationship);
        }

        let mut matrix = Self::new();
        for (pair, relationship) in seen {
            matrix.set(pair, relationship);
        }
        Ok(matrix)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(name: &str) -> AgentId {
        AgentId::from(name)
    }

    fn pair(a: &str, b: &str) -> AgentPair {
        AgentPair::new(id(a), id(b)).unwrap()
    }

    // -----------------------------------------------------------------------
    // AgentPair
    // -----------------------------------------------------------------------

    #[test]
    fn pair_is_order_independent() {
        assert_eq!(pair("agentA", "agentB"), pair("agentB", "agentA"));
        assert_eq!(pair("agentB", "agentA").first(), &id("agentA"));
        assert_eq!(pair("agentB", "agentA").second(), &id("agentB"));
    }

    #[test]
    fn self_pair_is_rejected() {
        assert!(AgentPair::new(id("agentA"), id("agentA")).is_none());
    }

    #[test]
    fn other_end_lookup() {
        let p = pair("agentA", "agentC");
        assert_eq!(p.other(&id("agentA")), Some(&id("agentC")));
        assert_eq!(p.other(&id("agentC")), Some(&id("agentA")));
        assert_eq!(p.other(&id("agentB")), None);
        assert!(p.contains(&id("agentC")));
        assert!(!p.contains(&id("agentB")));
    }

    // -----------------------------------------------------------------------
    // Matrix reads and writes
    // -----------------------------------------------------------------------

    #[test]
    fn reads_are_symmetric() {
        let mut matrix = RelationshipMatrix::new();
        matrix.set(pair("agentA", "agentB"), Relationship::Alliance);

        assert_eq!(matrix.get(&id("agentA"), &id("agentB")), Relationship::Alliance);
        assert_eq!(matrix.get(&id("agentB"), &id("agentA")), Relationship::Alliance);
        assert_eq!(matrix.get(&id("agentA"), &id("agentC")), Relationship::Neutral);
    }

    #[test]
    fn setting_neutral_removes_entry() {
        let mut matrix = RelationshipMatrix::new();
        let previous = matrix.set(pair("agentA", "agentB"), Relationship::Battle);
        assert_eq!(previous, Relationship::Neutral);
        assert_eq!(matrix.len(), 1);

        let previous = matrix.set(pair("agentA", "agentB"), Relationship::Neutral);
        assert_eq!(previous, Relationship::Battle);
        assert!(matrix.is_empty());
        assert_eq!(matrix, RelationshipMatrix::new());
    }

    #[test]
    fn pairs_with_filters_by_value() {
        let mut matrix = RelationshipMatrix::new();
        matrix.set(pair("agentA", "agentB"), Relationship::Battle);
        matrix.set(pair("agentC", "agentD"), Relationship::Alliance);
        matrix.set(pair("agentA", "agentD"), Relationship::Battle);

        let battles: Vec<&AgentPair> = matrix.pairs_with(Relationship::Battle).collect();
        assert_eq!(battles, vec![&pair("agentA", "agentB"), &pair("agentA", "agentD")]);
        assert_eq!(matrix.pairs_with(Relationship::Neutral).count(), 0);
    }

    // -----------------------------------------------------------------------
    // Wire form
    // -----------------------------------------------------------------------

    #[test]
    fn serializes_as_entry_list() {
        let mut matrix = RelationshipMatrix::new();
        matrix.set(pair("agentB", "agentA"), Relationship::Alliance);

        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"agents": ["agentA", "agentB"], "relationship": "alliance"}])
        );

        let back: RelationshipMatrix = serde_json::from_value(json).unwrap();
        assert_eq!(back, matrix);
    }

    #[test]
    fn duplicate_consistent_entries_collapse() {
        let json = serde_json::json!([
            {"agents": ["agentA", "agentB"], "relationship": "battle"},
            {"agents": ["agentB", "agentA"], "relationship": "battle"},
            {"agents": ["agentA", "agentC"], "relationship": "neutral"}
        ]);
        let matrix: RelationshipMatrix = serde_json::from_value(json).unwrap();
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.get(&id("agentB"), &id("agentA")), Relationship::Battle);
    }

    #[test]
    fn drifted_directed_entries_are_rejected() {
        let raw = vec![
            RelationshipEntry {
                agents: [id("agentA"), id("agentB")],
                relationship: Relationship::Alliance,
            },
            RelationshipEntry {
                agents: [id("agentB"), id("agentA")],
                relationship: Relationship::Neutral,
            },
        ];
        let err = RelationshipMatrix::try_from(raw).unwrap_err();
        assert_eq!(
            err,
            MatrixError::Conflicting {
                pair: pair("agentA", "agentB"),
                first: Relationship::Alliance,
                second: Relationship::Neutral,
            }
        );
    }

    #[test]
    fn self_entry_is_rejected() {
        let raw = vec![RelationshipEntry {
            agents: [id("agentA"), id("agentA")],
            relationship: Relationship::Battle,
        }];
        assert_eq!(
            RelationshipMatrix::try_from(raw).unwrap_err(),
            MatrixError::SelfRelationship(id("agentA"))
        );
    }
}
