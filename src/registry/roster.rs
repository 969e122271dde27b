//! Validated, immutable roster with precomputed rank tables.
//!
//! A [`Roster`] is built once from an [`AgentRegistry`] that passed
//! validation. Preference lists are translated to dense opposite-side
//! indices and inverted into rank tables, so that every rank comparison in
//! the proposal loop is an O(1) array read.

use crate::error::{MatchError, Result};
use crate::registry::AgentRegistry;
use crate::types::{Agent, AgentId, Rank, Side, UNRANKED};

/// Preference and rank tables for one side, indexed by registry index.
#[derive(Debug, Clone, Default)]
struct RankTable {
    /// `ids[a]` = id of the agent at registry index a
    ids: Vec<AgentId>,
    /// `preferences[a][k]` = index of a's k-th choice
    preferences: Vec<Vec<usize>>,
    /// `ranks[a][b]` = position of b in a's list
    ranks: Vec<Vec<Rank>>,
}

impl RankTable {
    fn build(registry: &AgentRegistry, side: Side) -> Self {
        let opposite = side.opposite();
        let width = registry.len(opposite);
        let mut table = RankTable {
            ids: Vec::with_capacity(registry.len(side)),
            preferences: Vec::with_capacity(registry.len(side)),
            ranks: Vec::with_capacity(registry.len(side)),
        };

        for agent in registry.agents(side) {
            // Validation guarantees every id resolves
            let preferences: Vec<usize> = agent
                .preferences
                .iter()
                .filter_map(|&id| registry.bench(opposite).key_of(id))
                .collect();

            let mut ranks = vec![UNRANKED; width];
            for (rank, &other) in preferences.iter().enumerate() {
                ranks[other] = rank;
            }

            table.ids.push(agent.id);
            table.preferences.push(preferences);
            table.ranks.push(ranks);
        }

        table
    }
}

/// Immutable, validated set of proposers and receivers.
///
/// ## Example
///
/// ```
/// use stable_match::registry::Roster;
/// use stable_match::types::{Agent, Side};
///
/// let roster = Roster::new(
///     vec![Agent::new(1, "a", [10, 20]), Agent::new(2, "b", [20, 10])],
///     vec![Agent::new(10, "x", [2, 1]), Agent::new(20, "y", [1, 2])],
/// ).unwrap();
///
/// assert_eq!(roster.size(), 2);
/// assert_eq!(roster.rank_at(Side::Receiver, 0, Some(1)), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Roster {
    registry: AgentRegistry,
    proposers: RankTable,
    receivers: RankTable,
}

impl Roster {
    /// Register both sides and validate them
    ///
    /// # Errors
    ///
    /// - [`MatchError::SizeMismatch`] if the sides differ in size
    /// - [`MatchError::DuplicateId`] if an id repeats within a side
    /// - [`MatchError::IncompletePreference`] if a list is not a strict
    ///   ranking of the whole opposite side
    pub fn new(proposers: Vec<Agent>, receivers: Vec<Agent>) -> Result<Self> {
        if proposers.len() != receivers.len() {
            return Err(MatchError::SizeMismatch {
                proposers: proposers.len(),
                receivers: receivers.len(),
            });
        }

        let mut registry = AgentRegistry::with_capacity(proposers.len());
        for agent in proposers {
            registry.insert(Side::Proposer, agent)?;
        }
        for agent in receivers {
            registry.insert(Side::Receiver, agent)?;
        }

        Self::from_registry(registry)
    }

    /// Validate a populated registry and freeze it
    pub fn from_registry(registry: AgentRegistry) -> Result<Self> {
        let proposers = registry.len(Side::Proposer);
        let receivers = registry.len(Side::Receiver);
        if proposers != receivers {
            return Err(MatchError::SizeMismatch { proposers, receivers });
        }

        registry.validate()?;

        Ok(Self {
            proposers: RankTable::build(&registry, Side::Proposer),
            receivers: RankTable::build(&registry, Side::Receiver),
            registry,
        })
    }

    #[inline]
    fn table(&self, side: Side) -> &RankTable {
        match side {
            Side::Proposer => &self.proposers,
            Side::Receiver => &self.receivers,
        }
    }

    /// Number of agents on each side
    #[inline]
    pub fn size(&self) -> usize {
        self.proposers.ids.len()
    }

    /// Look up an agent by id
    pub fn lookup(&self, side: Side, id: AgentId) -> Result<&Agent> {
        self.registry.lookup(side, id)
    }

    /// Registry index of an agent
    #[inline]
    pub fn index_of(&self, side: Side, id: AgentId) -> Result<usize> {
        self.registry.index_of(side, id)
    }

    /// Id of the agent at a registry index
    ///
    /// # Panics
    ///
    /// If `index` is out of range; indices come from this roster.
    #[inline]
    pub fn id_at(&self, side: Side, index: usize) -> AgentId {
        self.table(side).ids[index]
    }

    /// Preference list of an agent as opposite-side indices
    #[inline]
    pub fn preferences_at(&self, side: Side, index: usize) -> &[usize] {
        &self.table(side).preferences[index]
    }

    /// Rank that agent `index` gives to `other`
    ///
    /// `None` stands for "no partner" and ranks as [`UNRANKED`], below every
    /// listed agent.
    #[inline]
    pub fn rank_at(&self, side: Side, index: usize, other: Option<usize>) -> Rank {
        match other {
            Some(other) => self.table(side).ranks[index]
                .get(other)
                .copied()
                .unwrap_or(UNRANKED),
            None => UNRANKED,
        }
    }

    /// Rank that agent `id` gives to `other`, by id
    pub fn rank_of(&self, side: Side, id: AgentId, other: Option<AgentId>) -> Result<Rank> {
        let index = self.index_of(side, id)?;
        let other = other
            .map(|other| self.index_of(side.opposite(), other))
            .transpose()?;
        Ok(self.rank_at(side, index, other))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreferenceDefect;

    fn roster() -> Roster {
        Roster::new(
            vec![Agent::new(1, "a", [20, 10]), Agent::new(2, "b", [10, 20])],
            vec![Agent::new(10, "x", [1, 2]), Agent::new(20, "y", [2, 1])],
        )
        .unwrap()
    }

    #[test]
    fn test_roster_size_mismatch() {
        let err = Roster::new(vec![Agent::new(1, "a", [10])], vec![]).unwrap_err();
        assert_eq!(err, MatchError::SizeMismatch { proposers: 1, receivers: 0 });
    }

    #[test]
    fn test_roster_duplicate() {
        let err = Roster::new(
            vec![Agent::new(1, "a", [10, 20]), Agent::new(1, "b", [10, 20])],
            vec![Agent::new(10, "x", [1]), Agent::new(20, "y", [1])],
        )
        .unwrap_err();
        assert_eq!(err, MatchError::DuplicateId { side: Side::Proposer, id: AgentId(1) });
    }

    #[test]
    fn test_roster_incomplete() {
        let err = Roster::new(
            vec![Agent::new(1, "a", [10])],
            vec![Agent::new(10, "x", Vec::new())],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MatchError::IncompletePreference {
                side: Side::Receiver,
                id: AgentId(10),
                defect: PreferenceDefect::Missing(AgentId(1)),
            }
        );
    }

    #[test]
    fn test_preferences_as_indices() {
        let roster = roster();
        assert_eq!(roster.preferences_at(Side::Proposer, 0), &[1, 0]);
        assert_eq!(roster.preferences_at(Side::Receiver, 1), &[1, 0]);
    }

    #[test]
    fn test_rank_at() {
        let roster = roster();

        // a ranks y first, x second
        assert_eq!(roster.rank_at(Side::Proposer, 0, Some(1)), 0);
        assert_eq!(roster.rank_at(Side::Proposer, 0, Some(0)), 1);

        // Unmatched is worse than anyone
        assert_eq!(roster.rank_at(Side::Proposer, 0, None), UNRANKED);
        assert!(roster.rank_at(Side::Receiver, 0, Some(1)) < UNRANKED);
    }

    #[test]
    fn test_rank_of_by_id() {
        let roster = roster();

        assert_eq!(roster.rank_of(Side::Receiver, AgentId(20), Some(AgentId(2))).unwrap(), 0);
        assert_eq!(roster.rank_of(Side::Receiver, AgentId(20), None).unwrap(), UNRANKED);
        assert!(roster.rank_of(Side::Receiver, AgentId(30), None).is_err());
        assert!(roster.rank_of(Side::Receiver, AgentId(20), Some(AgentId(9))).is_err());
    }

    #[test]
    fn test_id_at() {
        let roster = roster();
        assert_eq!(roster.id_at(Side::Proposer, 1), AgentId(2));
        assert_eq!(roster.id_at(Side::Receiver, 0), AgentId(10));
    }

    #[test]
    fn test_empty_roster() {
        let roster = Roster::new(vec![], vec![]).unwrap();
        assert_eq!(roster.size(), 0);
    }
}
