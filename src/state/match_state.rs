//! Mutable match state: who is paired with whom, and who proposed to whom.
//!
//! ## Invariant
//!
//! `proposer_partner[p] == Some(r)` if and only if
//! `receiver_partner[r] == Some(p)`. Every mutation goes through
//! [`set_match`](MatchState::set_match) or
//! [`clear_match`](MatchState::clear_match), which update both directions
//! before returning. The deferred-acceptance accept step and the manual
//! override path share `set_match`.
//!
//! ## History
//!
//! `proposed[p]` and `received[r]` only ever grow during a run.

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};

use crate::registry::Roster;
use crate::types::{AgentId, Rank, Side};

/// Pairings broken by a [`MatchState::set_match`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Displaced {
    /// Previous partner of the receiver, now free
    pub proposer: Option<usize>,
    /// Previous partner of the proposer, now free
    pub receiver: Option<usize>,
}

/// Current partial matching plus proposal history, over registry indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    proposer_partner: Vec<Option<usize>>,
    receiver_partner: Vec<Option<usize>>,
    proposed: Vec<BTreeSet<usize>>,
    received: Vec<BTreeSet<usize>>,
    exhausted: Vec<bool>,
}

impl MatchState {
    /// Create an empty state for `size` agents per side
    pub fn new(size: usize) -> Self {
        Self {
            proposer_partner: vec![None; size],
            receiver_partner: vec![None; size],
            proposed: vec![BTreeSet::new(); size],
            received: vec![BTreeSet::new(); size],
            exhausted: vec![false; size],
        }
    }

    /// Number of agents per side
    #[inline]
    pub fn size(&self) -> usize {
        self.proposer_partner.len()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Pair `proposer` with `receiver`, breaking any previous pairing of
    /// either one first
    ///
    /// # Returns
    ///
    /// The agents that lost their partner because of this call. Re-matching
    /// an existing pair displaces nobody.
    pub fn set_match(&mut self, proposer: usize, receiver: usize) -> Displaced {
        let mut displaced = Displaced::default();

        if let Some(old) = self.proposer_partner[proposer] {
            if old != receiver {
                if self.receiver_partner[old] == Some(proposer) {
                    self.receiver_partner[old] = None;
                }
                displaced.receiver = Some(old);
            }
        }

        if let Some(old) = self.receiver_partner[receiver] {
            if old != proposer {
                if self.proposer_partner[old] == Some(receiver) {
                    self.proposer_partner[old] = None;
                }
                displaced.proposer = Some(old);
            }
        }

        self.proposer_partner[proposer] = Some(receiver);
        self.receiver_partner[receiver] = Some(proposer);

        debug_assert!(self.is_symmetric());
        displaced
    }

    /// Unmatch one agent and, if it points back, its partner
    ///
    /// # Returns
    ///
    /// The former partner's index, if any
    pub fn clear_match(&mut self, side: Side, index: usize) -> Option<usize> {
        let (own, other) = match side {
            Side::Proposer => (&mut self.proposer_partner, &mut self.receiver_partner),
            Side::Receiver => (&mut self.receiver_partner, &mut self.proposer_partner),
        };

        let partner = own[index].take()?;
        if other[partner] == Some(index) {
            other[partner] = None;
        }

        debug_assert!(self.is_symmetric());
        Some(partner)
    }

    /// Record that `proposer` proposed to `receiver`
    ///
    /// Idempotent: recording the same proposal twice is a no-op.
    ///
    /// # Returns
    ///
    /// `true` if this proposal was not recorded before
    pub fn record_proposal(&mut self, proposer: usize, receiver: usize) -> bool {
        let fresh = self.proposed[proposer].insert(receiver);
        self.received[receiver].insert(proposer);
        fresh
    }

    /// Exclude a proposer with no candidates left from future selection
    pub fn mark_exhausted(&mut self, proposer: usize) {
        self.exhausted[proposer] = true;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current partner of an agent
    #[inline]
    pub fn partner(&self, side: Side, index: usize) -> Option<usize> {
        match side {
            Side::Proposer => self.proposer_partner[index],
            Side::Receiver => self.receiver_partner[index],
        }
    }

    /// Check if a proposer is unmatched
    #[inline]
    pub fn is_free(&self, proposer: usize) -> bool {
        self.proposer_partner[proposer].is_none()
    }

    /// Check if a proposer has run out of candidates
    #[inline]
    pub fn is_exhausted(&self, proposer: usize) -> bool {
        self.exhausted[proposer]
    }

    /// Check if a proposer should still be selected by the proposal loop
    #[inline]
    pub fn is_eligible(&self, proposer: usize) -> bool {
        self.is_free(proposer) && !self.is_exhausted(proposer)
    }

    /// Check if `proposer` has already proposed to `receiver`
    #[inline]
    pub fn has_proposed(&self, proposer: usize, receiver: usize) -> bool {
        self.proposed[proposer].contains(&receiver)
    }

    /// Receivers a proposer has proposed to
    #[inline]
    pub fn proposed(&self, proposer: usize) -> &BTreeSet<usize> {
        &self.proposed[proposer]
    }

    /// Proposers a receiver has received proposals from
    #[inline]
    pub fn received(&self, receiver: usize) -> &BTreeSet<usize> {
        &self.received[receiver]
    }

    /// Rank an agent gives its current partner ([`UNRANKED`](crate::types::UNRANKED) if unmatched)
    #[inline]
    pub fn partner_rank(&self, roster: &Roster, side: Side, index: usize) -> Rank {
        roster.rank_at(side, index, self.partner(side, index))
    }

    /// Number of matched pairs
    pub fn matched_count(&self) -> usize {
        self.proposer_partner.iter().filter(|p| p.is_some()).count()
    }

    /// Check if every proposer (and so every receiver) is matched
    pub fn is_complete(&self) -> bool {
        self.matched_count() == self.size()
    }

    /// Matched pairs as `(proposer, receiver)` indices in proposer order
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.proposer_partner
            .iter()
            .enumerate()
            .filter_map(|(proposer, receiver)| receiver.map(|receiver| (proposer, receiver)))
    }

    /// Check the symmetry invariant
    pub fn is_symmetric(&self) -> bool {
        let forward = self
            .proposer_partner
            .iter()
            .enumerate()
            .all(|(p, r)| r.map_or(true, |r| self.receiver_partner[r] == Some(p)));
        let backward = self
            .receiver_partner
            .iter()
            .enumerate()
            .all(|(r, p)| p.map_or(true, |p| self.proposer_partner[p] == Some(r)));
        forward && backward
    }

    // ========================================================================
    // State Root
    // ========================================================================

    /// SHA-256 of the matched pairs, by agent id, in proposer registry order
    ///
    /// Each pair contributes `proposer_id || receiver_id` as little-endian
    /// u64s. Two states with the same pairs have the same root regardless of
    /// proposal history.
    pub fn state_root(&self, roster: &Roster) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for (proposer, receiver) in self.pairs() {
            hasher.update(roster.id_at(Side::Proposer, proposer).get().to_le_bytes());
            hasher.update(roster.id_at(Side::Receiver, receiver).get().to_le_bytes());
        }
        hasher.finalize().into()
    }

    /// Matched pairs by id in proposer order
    pub fn id_pairs(&self, roster: &Roster) -> Vec<(AgentId, AgentId)> {
        self.pairs()
            .map(|(p, r)| (roster.id_at(Side::Proposer, p), roster.id_at(Side::Receiver, r)))
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
