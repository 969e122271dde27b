//! Match state for the deferred-acceptance engine.
//!
//! ## Components
//!
//! - [`MatchState`]: partner arrays for both sides, proposal history and
//!   the exhausted-proposer flags
//! - [`Displaced`]: pairings broken by a single `set_match`
//!
//! All indices are registry indices from a [`Roster`](crate::registry::Roster).

pub mod match_state;

pub use match_state::{Displaced, MatchState};
