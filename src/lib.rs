//! # Stable Match
//!
//! Step-driven deferred-acceptance (Gale-Shapley) engine for one-to-one
//! stable matching between two equally sized, fully ranked sides.
//!
//! ## Architecture
//!
//! - **Types**: agents, events, receipts and quality metrics
//! - **Registry**: append-only agent storage, validated into a [`Roster`]
//! - **State**: the symmetric partial matching plus proposal history
//! - **Engine**: the proposal loop, the stability checker and overrides
//! - **Sink**: where every micro-step is reported
//!
//! ## Design Principles
//!
//! 1. **Determinism**: all operations produce identical results for identical inputs
//! 2. **One Event Per Step**: an observer can replay the run phase by phase
//! 3. **Synchronous Core**: no timers or threads inside the engine
//! 4. **Validate Early**: every error is raised at setup, never mid-run

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Agent, MatchEvent, RunReceipt
pub mod types;

/// Agent registry and validated roster
pub mod registry;

/// Match state: partners and proposal history
pub mod state;

/// Proposal engine and stability checker
pub mod engine;

/// Event sinks
pub mod sink;

/// Engine configuration
pub mod config;

/// Setup errors
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{EngineConfig, SelectionPolicy};
pub use engine::{Engine, SharedEngine, StepOutcome, Termination};
pub use error::{MatchError, PreferenceDefect, Result};
pub use registry::{AgentRegistry, Roster};
pub use sink::{EventSink, NullSink, RecordingSink, TracingSink};
pub use state::MatchState;
pub use types::{Agent, AgentId, BlockingPair, MatchEvent, Phase, Side};
