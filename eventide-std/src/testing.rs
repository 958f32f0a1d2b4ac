//! Testing utilities for Eventide.
//!
//! This module provides utilities to make testing subscribers and dispatch
//! order easier.
//!
//! # Features
//!
//! - [`RecordingSink`]: An error sink that records every reported failure
//! - [`EventLog`]: A shared, ordered log of deliveries

use eventide_core::{ErrorSink, Event, EventType, HandlerBinding, HandlerError};
use parking_lot::Mutex;
use std::sync::Arc;

// ============================================================================
// Recording Sink
// ============================================================================

/// One failure captured by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Concrete type of the event being dispatched.
    pub event_type: EventType,
    /// The failing binding, rendered with `Display`.
    pub handler: String,
    /// The error, rendered with `Display`.
    pub error: String,
}

/// An error sink that records all failures it receives.
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust,ignore
/// let sink = RecordingSink::new();
/// let bus = EventBus::builder().error_sink(sink.clone()).build();
///
/// bus.post(Trigger);
///
/// assert_eq!(sink.count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    failures: Arc<Mutex<Vec<Failure>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the recorded failures.
    pub fn failures(&self) -> Vec<Failure> {
        self.failures.lock().clone()
    }

    /// Get the number of recorded failures.
    pub fn count(&self) -> usize {
        self.failures.lock().len()
    }

    /// Clear all recorded failures.
    pub fn clear(&self) {
        self.failures.lock().clear();
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, event: &dyn Event, binding: &HandlerBinding, error: &HandlerError) {
        self.failures.lock().push(Failure {
            event_type: event.event_type(),
            handler: binding.to_string(),
            error: error.to_string(),
        });
    }
}

// ============================================================================
// Event Log
// ============================================================================

/// A shared, ordered log of entries written by handlers.
///
/// Useful for asserting the global order in which handlers ran.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// Get a clone of all entries, in order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of entries equal to `entry`.
    pub fn count_of(&self, entry: &str) -> usize {
        self.entries.lock().iter().filter(|e| *e == entry).count()
    }
}
