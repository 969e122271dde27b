//! Error types for setup and validation.
//!
//! All errors are raised while registering agents or initializing an
//! engine. Once a roster is validated, the algorithm itself cannot fail:
//! preference lists are closed over the registry, so no unknown id can be
//! encountered mid-run.

use thiserror::Error;

use crate::types::{AgentId, Side};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MatchError>;

/// Setup and lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// An agent with this id is already registered on this side
    #[error("duplicate {side} id {id}")]
    DuplicateId { side: Side, id: AgentId },

    /// A preference list is not a strict ranking of every opposite-side agent
    #[error("{side} {id} has an incomplete preference list: {defect}")]
    IncompletePreference {
        side: Side,
        id: AgentId,
        defect: PreferenceDefect,
    },

    /// Proposer and receiver counts differ
    #[error("size mismatch: {proposers} proposers vs {receivers} receivers")]
    SizeMismatch { proposers: usize, receivers: usize },

    /// No agent with this id on this side
    #[error("unknown {side} {id}")]
    UnknownAgent { side: Side, id: AgentId },
}

/// What is wrong with a preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreferenceDefect {
    /// An opposite-side agent is not ranked
    #[error("{0} is not ranked")]
    Missing(AgentId),

    /// An opposite-side agent is ranked more than once
    #[error("{0} is ranked more than once")]
    Duplicate(AgentId),

    /// The list names an id that is not registered on the opposite side
    #[error("{0} is not a registered agent")]
    Unknown(AgentId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MatchError::IncompletePreference {
            side: Side::Receiver,
            id: AgentId(2),
            defect: PreferenceDefect::Missing(AgentId(9)),
        };
        assert_eq!(
            err.to_string(),
            "receiver #2 has an incomplete preference list: #9 is not ranked"
        );

        let err = MatchError::SizeMismatch { proposers: 3, receivers: 2 };
        assert_eq!(err.to_string(), "size mismatch: 3 proposers vs 2 receivers");
    }
}
