//! The fallback event for posts that reach no handler.

use crate::bus::EventBus;
use eventide_core::{Event, Hierarchy};
use std::sync::Arc;

/// Wraps an event that was posted but had no handler to receive it.
///
/// Subscribe to `DeadEvent` to find events that are silently lost, usually
/// because of a missing registration. A `DeadEvent` that itself has no
/// handler is dropped; it is never wrapped again.
#[derive(Debug, Clone)]
pub struct DeadEvent {
    source: EventBus,
    event: Arc<dyn Event>,
}

impl DeadEvent {
    /// Wrap `event`, which `source` could not deliver.
    pub fn new(source: EventBus, event: Arc<dyn Event>) -> Self {
        Self { source, event }
    }

    /// The bus the event was posted to.
    pub fn source(&self) -> &EventBus {
        &self.source
    }

    /// The undelivered event.
    pub fn event(&self) -> &Arc<dyn Event> {
        &self.event
    }
}

impl Hierarchy for DeadEvent {}
