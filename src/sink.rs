//! Event sinks: where the engine reports each step.
//!
//! The engine calls [`EventSink::on_event`] synchronously at every emission
//! point and does not wait for anything else. A sink that needs to pace or
//! animate should hand the event off (for example to a channel) and return;
//! the driver decides when to call `step()` again.

use std::sync::mpsc::Sender;

use crate::types::MatchEvent;

/// Receiver of engine events.
pub trait EventSink {
    /// Observe one event
    fn on_event(&mut self, event: &MatchEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_event(&mut self, event: &MatchEvent) {
        (**self).on_event(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn on_event(&mut self, event: &MatchEvent) {
        (**self).on_event(event);
    }
}

/// Posts a copy of each event to a channel without blocking.
///
/// A disconnected receiver means nobody is watching; the engine carries on.
impl EventSink for Sender<MatchEvent> {
    fn on_event(&mut self, event: &MatchEvent) {
        let _ = self.send(event.clone());
    }
}

// ============================================================================
// Built-in sinks
// ============================================================================

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    #[inline]
    fn on_event(&mut self, _event: &MatchEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    events: Vec<MatchEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events seen so far
    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    /// Take all events, leaving the sink empty
    pub fn drain(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for RecordingSink {
    fn on_event(&mut self, event: &MatchEvent) {
        self.events.push(event.clone());
    }
}

/// Forwards events to `tracing` at debug level (Finished at info).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&mut self, event: &MatchEvent) {
        match event {
            MatchEvent::Highlighted { phase, proposer, receiver } => {
                tracing::debug!(?phase, ?proposer, ?receiver, "highlight");
            }
            MatchEvent::Accepted { proposer, receiver, displaced } => {
                tracing::debug!(%proposer, %receiver, ?displaced, "accepted");
            }
            MatchEvent::Rejected { proposer, receiver } => {
                tracing::debug!(%proposer, %receiver, "rejected");
            }
            MatchEvent::Finished { stable, blocking_pairs } => {
                tracing::info!(stable, blocking = blocking_pairs.len(), "finished");
            }
        }
    }
}

/// Adapts a closure into a sink.
///
/// ## Example
///
/// ```
/// use stable_match::sink::{EventSink, FnSink};
/// use stable_match::types::MatchEvent;
///
/// let mut count = 0;
/// let mut sink = FnSink::new(|_: &MatchEvent| count += 1);
/// sink.on_event(&MatchEvent::Finished { stable: true, blocking_pairs: vec![] });
/// drop(sink);
/// assert_eq!(count, 1);
/// ```
pub struct FnSink<F>(F);

impl<F: FnMut(&MatchEvent)> FnSink<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F: FnMut(&MatchEvent)> EventSink for FnSink<F> {
    fn on_event(&mut self, event: &MatchEvent) {
        (self.0)(event);
    }
}
