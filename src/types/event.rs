//! Events emitted by the proposal engine.
//!
//! Every micro-step of deferred acceptance produces exactly one
//! [`MatchEvent`]. A presentation layer consumes them through an
//! [`EventSink`](crate::sink::EventSink) to animate progress; the engine
//! itself never renders or waits.

use std::fmt;

use crate::types::AgentId;

/// Phase of the proposal loop an event belongs to.
///
/// Numbered like the lines of the loop it mirrors. Line 2 is the proposal
/// itself, which always resolves to line 3 or 4.
///
/// ```text
/// 0  while let proposer = first_free_proposer()
/// 1      let receiver = first_unproposed(proposer)
/// 2      if propose(proposer, receiver)
/// 3          accepted
/// 4      else rejected
/// 5  finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    SelectProposer,
    SelectCandidate,
    Accept,
    Reject,
    Finish,
}

impl Phase {
    /// Line number of this phase in the loop above
    pub fn line(self) -> u8 {
        match self {
            Phase::SelectProposer => 0,
            Phase::SelectCandidate => 1,
            Phase::Accept => 3,
            Phase::Reject => 4,
            Phase::Finish => 5,
        }
    }
}

/// A proposer/receiver pair that would both rather be with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockingPair {
    pub proposer: AgentId,
    pub receiver: AgentId,
}

impl BlockingPair {
    pub fn new(proposer: AgentId, receiver: AgentId) -> Self {
        Self { proposer, receiver }
    }
}

impl fmt::Display for BlockingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.proposer, self.receiver)
    }
}

/// One observable step of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// A selection phase ran; `None` means nothing was found
    Highlighted {
        phase: Phase,
        proposer: Option<AgentId>,
        receiver: Option<AgentId>,
    },

    /// The receiver accepted the proposer, releasing `displaced` if any
    Accepted {
        proposer: AgentId,
        receiver: AgentId,
        displaced: Option<AgentId>,
    },

    /// The receiver kept its current partner
    Rejected { proposer: AgentId, receiver: AgentId },

    /// No free proposer remains
    Finished {
        stable: bool,
        blocking_pairs: Vec<BlockingPair>,
    },
}

impl MatchEvent {
    /// Phase this event corresponds to
    pub fn phase(&self) -> Phase {
        match self {
            MatchEvent::Highlighted { phase, .. } => *phase,
            MatchEvent::Accepted { .. } => Phase::Accept,
            MatchEvent::Rejected { .. } => Phase::Reject,
            MatchEvent::Finished { .. } => Phase::Finish,
        }
    }

    /// Check if this event resolves a proposal
    pub fn is_resolution(&self) -> bool {
        matches!(self, MatchEvent::Accepted { .. } | MatchEvent::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_phase() {
        let accepted = MatchEvent::Accepted {
            proposer: AgentId(1),
            receiver: AgentId(2),
            displaced: None,
        };
        assert_eq!(accepted.phase(), Phase::Accept);
        assert_eq!(accepted.phase().line(), 3);
        assert!(accepted.is_resolution());

        let highlighted = MatchEvent::Highlighted {
            phase: Phase::SelectCandidate,
            proposer: Some(AgentId(1)),
            receiver: None,
        };
        assert_eq!(highlighted.phase().line(), 1);
        assert!(!highlighted.is_resolution());
    }

    #[test]
    fn test_blocking_pair_ordering() {
        let a = BlockingPair::new(AgentId(1), AgentId(5));
        let b = BlockingPair::new(AgentId(2), AgentId(0));
        assert!(a < b);
        assert_eq!(a.to_string(), "(#1, #5)");
    }
}
