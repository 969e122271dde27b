//! Engine configuration.
//!
//! The only tunable is the free-proposer selection order. Any deterministic
//! order terminates with the same proposer-optimal matching; the choice
//! only changes the sequence of events an observer sees.

/// How the engine picks the next free proposer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionPolicy {
    /// Resume scanning just after the last chosen proposer, wrapping around
    #[default]
    RoundRobin,
    /// Always scan from the first registered proposer
    FirstFree,
}

/// Engine configuration
///
/// ## Example
///
/// ```
/// use stable_match::{EngineConfig, SelectionPolicy};
///
/// let config = EngineConfig::default().with_selection(SelectionPolicy::FirstFree);
/// assert_eq!(config.selection, SelectionPolicy::FirstFree);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// Free-proposer selection order
    pub selection: SelectionPolicy,
}

impl EngineConfig {
    /// Create the default configuration (round-robin selection)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection policy
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }
}
