//! Thread-safe handle around an [`Engine`].
//!
//! The proposal loop and the manual override path must never touch the
//! match state at the same time. A [`SharedEngine`] keeps the engine behind
//! one [`parking_lot::Mutex`]; every operation holds the lock for exactly
//! one step or one override, so a driver thread stepping the algorithm and
//! a UI thread forcing matches are serialized without either blocking for
//! longer than a single phase.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::{Engine, Released, StepOutcome, Termination};
use crate::error::Result;
use crate::sink::EventSink;
use crate::types::{AgentId, BlockingPair, Side};

/// Cloneable, lock-protected engine handle.
pub struct SharedEngine<S> {
    inner: Arc<Mutex<Engine<S>>>,
}

impl<S> Clone for SharedEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: EventSink> SharedEngine<S> {
    /// Wrap an engine
    pub fn new(engine: Engine<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Advance exactly one phase under the lock
    pub fn step(&self) -> StepOutcome {
        self.inner.lock().step()
    }

    /// Step until termination, releasing the lock between steps
    pub fn run(&self) -> Termination {
        loop {
            if let StepOutcome::Terminated(termination) = self.step() {
                return termination;
            }
        }
    }

    /// See [`Engine::force_match`]
    pub fn force_match(&self, proposer: AgentId, receiver: AgentId) -> Result<Released> {
        self.inner.lock().force_match(proposer, receiver)
    }

    /// See [`Engine::clear_match`]
    pub fn clear_match(&self, side: Side, id: AgentId) -> Result<Option<AgentId>> {
        self.inner.lock().clear_match(side, id)
    }

    /// See [`Engine::check_stability`]
    pub fn check_stability(&self) -> Vec<BlockingPair> {
        self.inner.lock().check_stability()
    }

    /// Run `f` with exclusive access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine<S>) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    /// Recover the engine if this is the last handle
    pub fn try_unwrap(self) -> std::result::Result<Engine<S>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
