//! Agent registry: append-only storage for both sides.
//!
//! ## Memory Model
//!
//! Each side keeps its agents in a [`Slab`] plus an id -> key index, the same
//! shape an order book uses for orders. Agents are never removed, so slab
//! keys are handed out densely as `0, 1, 2, ...` and double as the agent's
//! registry order. The engine works on these dense keys internally.

use std::collections::{HashMap, HashSet};

use slab::Slab;

use crate::error::{MatchError, PreferenceDefect, Result};
use crate::types::{Agent, AgentId, Side};

/// Agents registered on one side.
#[derive(Debug, Clone, Default)]
pub(crate) struct Bench {
    agents: Slab<Agent>,
    index: HashMap<AgentId, usize>,
}

impl Bench {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            agents: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub(crate) fn key_of(&self, id: AgentId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    #[inline]
    pub(crate) fn get(&self, key: usize) -> Option<&Agent> {
        self.agents.get(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().map(|(_, agent)| agent)
    }
}

/// Registry of proposers and receivers.
///
/// Registration only rejects duplicate ids. Preference completeness depends
/// on both sides, which may be populated in either order, so it is checked
/// by [`validate`](Self::validate) when a run starts.
///
/// ## Example
///
/// ```
/// use stable_match::registry::AgentRegistry;
/// use stable_match::types::{AgentId, Side};
///
/// let mut registry = AgentRegistry::new();
/// registry.register(Side::Proposer, AgentId(1), vec![AgentId(1)]).unwrap();
/// registry.register(Side::Receiver, AgentId(1), vec![AgentId(1)]).unwrap();
///
/// assert!(registry.validate().is_ok());
/// assert_eq!(registry.len(Side::Proposer), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    proposers: Bench,
    receivers: Bench,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with room for `capacity` agents per side
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            proposers: Bench::with_capacity(capacity),
            receivers: Bench::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn bench(&self, side: Side) -> &Bench {
        match side {
            Side::Proposer => &self.proposers,
            Side::Receiver => &self.receivers,
        }
    }

    #[inline]
    fn bench_mut(&mut self, side: Side) -> &mut Bench {
        match side {
            Side::Proposer => &mut self.proposers,
            Side::Receiver => &mut self.receivers,
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register an agent by id and ranked preferences
    ///
    /// # Returns
    ///
    /// The agent's registry index on its side
    ///
    /// # Errors
    ///
    /// [`MatchError::DuplicateId`] if `id` is already registered on `side`
    pub fn register(&mut self, side: Side, id: AgentId, preferences: Vec<AgentId>) -> Result<usize> {
        self.insert(side, Agent::with_ids(id, String::new(), preferences))
    }

    /// Register a fully built agent
    pub fn insert(&mut self, side: Side, agent: Agent) -> Result<usize> {
        let bench = self.bench_mut(side);
        if bench.index.contains_key(&agent.id) {
            return Err(MatchError::DuplicateId { side, id: agent.id });
        }

        let id = agent.id;
        let key = bench.agents.insert(agent);
        bench.index.insert(id, key);
        Ok(key)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Look up an agent by id
    ///
    /// # Errors
    ///
    /// [`MatchError::UnknownAgent`] if no such agent is registered on `side`
    pub fn lookup(&self, side: Side, id: AgentId) -> Result<&Agent> {
        let key = self.index_of(side, id)?;
        self.bench(side)
            .get(key)
            .ok_or(MatchError::UnknownAgent { side, id })
    }

    /// Registry index of an agent
    pub fn index_of(&self, side: Side, id: AgentId) -> Result<usize> {
        self.bench(side)
            .key_of(id)
            .ok_or(MatchError::UnknownAgent { side, id })
    }

    /// Number of agents on a side
    #[inline]
    pub fn len(&self, side: Side) -> usize {
        self.bench(side).len()
    }

    /// Check if both sides are empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.proposers.len() == 0 && self.receivers.len() == 0
    }

    /// Agents on a side in registry order
    pub fn agents(&self, side: Side) -> impl Iterator<Item = &Agent> {
        self.bench(side).iter()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check that every preference list is a strict ranking of the whole
    /// opposite side
    ///
    /// Proposers are checked before receivers, each in registry order; the
    /// first defect found is reported.
    pub fn validate(&self) -> Result<()> {
        for side in [Side::Proposer, Side::Receiver] {
            let opposite = self.bench(side.opposite());
            for agent in self.bench(side).iter() {
                if let Some(defect) = Self::find_defect(agent, opposite) {
                    return Err(MatchError::IncompletePreference {
                        side,
                        id: agent.id,
                        defect,
                    });
                }
            }
        }
        Ok(())
    }

    fn find_defect(agent: &Agent, opposite: &Bench) -> Option<PreferenceDefect> {
        let mut seen = HashSet::with_capacity(agent.preferences.len());
        for &other in &agent.preferences {
            if opposite.key_of(other).is_none() {
                return Some(PreferenceDefect::Unknown(other));
            }
            if !seen.insert(other) {
                return Some(PreferenceDefect::Duplicate(other));
            }
        }

        opposite
            .iter()
            .find(|candidate| !seen.contains(&candidate.id))
            .map(|candidate| PreferenceDefect::Missing(candidate.id))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
