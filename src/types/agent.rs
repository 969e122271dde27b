//! Agent identity and preference types.
//!
//! ## Sides
//!
//! Every agent belongs to exactly one [`Side`]. Proposers and receivers are
//! structurally identical (an id plus a strict ranking of the opposite side)
//! but never interchangeable: the registry keys agents by `(side, id)`, so the
//! same numeric id may appear once on each side without ambiguity.
//!
//! ## Ranks
//!
//! A [`Rank`] is a 0-based position in a preference list; lower is more
//! preferred. [`UNRANKED`] compares worse than every real rank and is used
//! both for "absent from the list" and for "currently unmatched".

use std::fmt;

/// 0-based position of an agent in another agent's preference list.
pub type Rank = usize;

/// Sentinel rank: worse than anyone (also the rank of "no partner").
pub const UNRANKED: Rank = Rank::MAX;

// ============================================================================
// Side enum
// ============================================================================

/// Which side of the market an agent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// Makes proposals in rank order
    Proposer,
    /// Tentatively holds the best proposal seen so far
    Receiver,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Proposer => Side::Receiver,
            Side::Receiver => Side::Proposer,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Proposer => f.write_str("proposer"),
            Side::Receiver => f.write_str("receiver"),
        }
    }
}

// ============================================================================
// AgentId
// ============================================================================

/// Stable identity of an agent, unique within its side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AgentId(pub u64);

impl AgentId {
    /// Raw numeric value
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for AgentId {
    fn from(value: u64) -> Self {
        AgentId(value)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Agent struct
// ============================================================================

/// A ranked agent: identity plus a strict ranking of the opposite side.
///
/// The agent does not carry its side; the side it is registered under
/// decides whether it proposes or receives.
///
/// ## Example
///
/// ```
/// use stable_match::types::{Agent, AgentId};
///
/// let agent = Agent::new(1, "alice", [10, 11, 12]);
/// assert_eq!(agent.id, AgentId(1));
/// assert_eq!(agent.preferences[1], AgentId(11));
/// assert_eq!(agent.to_string(), "alice (#1)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    /// Unique identifier within the agent's side
    pub id: AgentId,

    /// Display name (not used by the algorithm)
    pub name: String,

    /// Opposite-side ids, most preferred first
    pub preferences: Vec<AgentId>,
}

impl Agent {
    /// Create a new agent from raw numeric ids
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier, unique within the side it is registered on
    /// * `name` - Display name
    /// * `preferences` - Opposite-side ids, most preferred first
    pub fn new(id: u64, name: impl Into<String>, preferences: impl IntoIterator<Item = u64>) -> Self {
        Self {
            id: AgentId(id),
            name: name.into(),
            preferences: preferences.into_iter().map(AgentId).collect(),
        }
    }

    /// Create a new agent from typed ids
    pub fn with_ids(id: AgentId, name: impl Into<String>, preferences: Vec<AgentId>) -> Self {
        Self {
            id,
            name: name.into(),
            preferences,
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
