//! Matching quality metrics in fixed-point arithmetic.
//!
//! Costs are sums of 1-based positions: an agent matched to its first
//! choice contributes 1. Means are [`Decimal`] so results are identical on
//! every platform.
//!
//! | Metric | Definition |
//! |--------|------------|
//! | proposer cost | sum of proposers' positions of their partners |
//! | receiver cost | sum of receivers' positions of their partners |
//! | egalitarian cost | proposer cost + receiver cost |
//! | sex-equality cost | \|proposer cost - receiver cost\| |

use rust_decimal::Decimal;

use crate::registry::Roster;
use crate::state::MatchState;
use crate::types::Side;

/// Decimal places kept for mean positions
pub const MEAN_DP: u32 = 4;

/// Quality of a (possibly partial) matching.
///
/// Unmatched agents contribute nothing to the costs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchQuality {
    /// Number of matched pairs
    pub matched: u64,
    pub proposer_cost: u64,
    pub receiver_cost: u64,
}

impl MatchQuality {
    /// Measure the pairs in `state`
    pub fn measure(roster: &Roster, state: &MatchState) -> Self {
        let mut quality = Self::default();
        for (proposer, receiver) in state.pairs() {
            quality.matched += 1;
            quality.proposer_cost += position(roster.rank_at(Side::Proposer, proposer, Some(receiver)));
            quality.receiver_cost += position(roster.rank_at(Side::Receiver, receiver, Some(proposer)));
        }
        quality
    }

    /// Sum of both sides' costs
    pub fn egalitarian_cost(&self) -> u64 {
        self.proposer_cost + self.receiver_cost
    }

    /// Imbalance between the two sides
    pub fn sex_equality_cost(&self) -> u64 {
        self.proposer_cost.abs_diff(self.receiver_cost)
    }

    /// Mean position proposers got, or None if nobody is matched
    pub fn proposer_mean(&self) -> Option<Decimal> {
        mean(self.proposer_cost, self.matched)
    }

    /// Mean position receivers got, or None if nobody is matched
    pub fn receiver_mean(&self) -> Option<Decimal> {
        mean(self.receiver_cost, self.matched)
    }
}

#[inline]
fn position(rank: usize) -> u64 {
    rank as u64 + 1
}

fn mean(total: u64, count: u64) -> Option<Decimal> {
    Decimal::from(total)
        .checked_div(Decimal::from(count))
        .map(|m| m.round_dp(MEAN_DP))
}

// ============================================================================
// Unit Tests
// ============================================================================
