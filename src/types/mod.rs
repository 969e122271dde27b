//! Core data types for the stable matching engine
//!
//! ## Types
//!
//! - [`Agent`]: an id plus a strict ranking of the opposite side
//! - [`Side`]: Proposer or Receiver
//! - [`MatchEvent`]: one observable step of the proposal loop
//! - [`BlockingPair`]: a pair that would rather be together
//! - [`RunReceipt`]: SSZ-encodable run summary
//! - [`MatchQuality`]: rank-based cost metrics

mod agent;
mod event;
mod receipt;
pub mod quality;

// Re-export all types at module level
pub use agent::{Agent, AgentId, Rank, Side, UNRANKED};
pub use event::{BlockingPair, MatchEvent, Phase};
pub use receipt::RunReceipt;
pub use quality::MatchQuality;
