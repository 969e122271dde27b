//! Run receipt: a compact, deterministic summary of a matching run.
//!
//! The receipt records proposal counters, the stability verdict and a
//! 32-byte state root of the final pairs. Two runs over the same roster
//! that end in the same matching have the same state root, so receipts can
//! be compared across machines.

use ssz_rs::prelude::*;

/// Summary of a run, SSZ-encodable.
///
/// ## Example
///
/// ```
/// use stable_match::types::RunReceipt;
///
/// let receipt = RunReceipt::new(
///     4,          // proposals
///     3,          // acceptances
///     1,          // rejections
///     0,          // overrides
///     0,          // blocking pairs
///     [0u8; 32],  // state root
/// );
/// assert!(receipt.stable);
/// assert_eq!(receipt.state_root_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct RunReceipt {
    /// Proposals resolved
    pub proposals: u64,

    /// Proposals accepted
    pub acceptances: u64,

    /// Proposals rejected
    pub rejections: u64,

    /// Manual overrides applied
    pub overrides: u64,

    /// Blocking pairs in the state the receipt was taken from
    pub blocking_pairs: u64,

    /// True iff `blocking_pairs == 0`
    pub stable: bool,

    /// SHA-256 of the matched pairs
    pub state_root: [u8; 32],
}

impl RunReceipt {
    /// Create a new receipt
    ///
    /// # Arguments
    ///
    /// * `proposals` - Count of resolved proposals
    /// * `acceptances` - Count of accepted proposals
    /// * `rejections` - Count of rejected proposals
    /// * `overrides` - Count of manual overrides
    /// * `blocking_pairs` - Count of blocking pairs
    /// * `state_root` - 32-byte hash of the matched pairs
    pub fn new(
        proposals: u64,
        acceptances: u64,
        rejections: u64,
        overrides: u64,
        blocking_pairs: u64,
        state_root: [u8; 32],
    ) -> Self {
        Self {
            proposals,
            acceptances,
            rejections,
            overrides,
            blocking_pairs,
            stable: blocking_pairs == 0,
            state_root,
        }
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
