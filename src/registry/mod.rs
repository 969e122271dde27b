//! Agent registry for the stable matching engine.
//!
//! ## Components
//!
//! - [`AgentRegistry`]: append-only, slab-backed storage for both sides
//! - [`Roster`]: validated, immutable snapshot with O(1) rank tables
//!
//! Agents are registered once at setup. Completeness of preference lists is
//! checked lazily, when a [`Roster`] is built, because the two sides may be
//! populated in either order.

pub mod agents;
pub mod roster;

pub use agents::AgentRegistry;
pub use roster::Roster;
