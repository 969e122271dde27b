//! Deferred-acceptance engine.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: same roster and configuration, same event sequence
//! 2. **Synchronous Execution**: no timers, no sleeping, no async; pacing
//!    belongs to whoever calls `step()`
//! 3. **Single Owner**: the engine owns its match state; overrides and
//!    steps are serialized by `&mut self` (or by [`SharedEngine`])
//!
//! ## Components
//!
//! - [`Engine`]: the step-wise proposal loop plus the override path
//! - [`find_blocking_pairs`]: stability check over any match state
//! - [`SharedEngine`]: mutex-guarded handle for multi-threaded drivers
//!
//! ## Example
//!
//! ```
//! use stable_match::engine::Engine;
//! use stable_match::types::{Agent, AgentId};
//!
//! let mut engine = Engine::initialize(
//!     vec![Agent::new(1, "a", [10, 20]), Agent::new(2, "b", [10, 20])],
//!     vec![Agent::new(10, "x", [1, 2]), Agent::new(20, "y", [1, 2])],
//! ).unwrap();
//!
//! let termination = engine.run();
//! assert!(termination.stable);
//! assert_eq!(engine.matches(), vec![(AgentId(1), AgentId(10)), (AgentId(2), AgentId(20))]);
//!
//! // Swap partners by hand and re-check
//! engine.force_match(AgentId(1), AgentId(20)).unwrap();
//! engine.force_match(AgentId(2), AgentId(10)).unwrap();
//! assert_eq!(engine.check_stability().len(), 1);
//! ```

pub mod proposal;
pub mod shared;
pub mod stability;

pub use proposal::{Engine, Released, RunStats, StepOutcome, Termination};
pub use shared::SharedEngine;
pub use stability::{find_blocking_pairs, is_stable};
