//! Blocking-pair detection.
//!
//! Works on any [`MatchState`]: deferred-acceptance output, a state edited
//! by manual overrides, or a partial matching where some agents are single.
//!
//! For each proposer `p`, only the receivers `p` ranks strictly above its
//! current partner can block (all of them if `p` is single). Such an `r`
//! blocks with `p` when `r` ranks `p` strictly above its own partner, or is
//! single.

use crate::registry::Roster;
use crate::state::MatchState;
use crate::types::{BlockingPair, Side};

/// Compute every blocking pair of `state`
///
/// # Returns
///
/// Pairs ordered by proposer registry order, then by the proposer's own
/// preference among its blocking receivers. Empty means stable.
pub fn find_blocking_pairs(roster: &Roster, state: &MatchState) -> Vec<BlockingPair> {
    let mut blocking = Vec::new();

    for proposer in 0..roster.size() {
        let current = state.partner(Side::Proposer, proposer);

        for &receiver in roster.preferences_at(Side::Proposer, proposer) {
            if Some(receiver) == current {
                break;
            }

            let held = state.partner_rank(roster, Side::Receiver, receiver);
            let offered = roster.rank_at(Side::Receiver, receiver, Some(proposer));
            if offered < held {
                blocking.push(BlockingPair::new(
                    roster.id_at(Side::Proposer, proposer),
                    roster.id_at(Side::Receiver, receiver),
                ));
            }
        }
    }

    blocking
}

/// Check whether `state` has no blocking pair
pub fn is_stable(roster: &Roster, state: &MatchState) -> bool {
    find_blocking_pairs(roster, state).is_empty()
}

// ============================================================================
// Unit Tests
// ============================================================================
