//! # Subscribers and Handler Discovery
//!
//! A [`Subscriber`] is any object that exposes handling methods. Turning a
//! subscriber into registry entries is the job of a [`HandlerDiscovery`]
//! strategy, which produces a [`HandlerMap`] of bindings keyed by the event
//! type each method was declared against.
//!
//! The core does not care how methods are found: the `#[subscriber]` macro
//! generates them at compile time, and manual implementations can list them
//! by hand.

use crate::{
    error::EventBusError,
    event::EventType,
    handler::{HandlerBinding, HandlerMethod},
};
use std::{any::Any, sync::Arc};

/// An object whose methods handle events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Subscriber`",
    label = "missing `Subscriber` implementation",
    note = "Annotate an `impl` block with `#[subscriber]` or implement `Subscriber` by hand."
)]
pub trait Subscriber: Send + Sync + 'static {
    /// Every handling method of this subscriber, in declaration order.
    fn handler_methods(&self) -> Vec<HandlerMethod>;

    /// Upcast to `Any`, used by handler calls to recover the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Strategy for extracting handler bindings from a subscriber.
pub trait HandlerDiscovery: Send + Sync {
    /// Enumerate every binding of `subscriber`, keyed by declared event type.
    ///
    /// Must be deterministic: discovering the same subscriber twice yields
    /// equal maps.
    fn discover(&self, subscriber: &Arc<dyn Subscriber>) -> Result<HandlerMap, EventBusError>;
}

/// Bindings grouped by the event type they were declared against.
///
/// Types keep first-insertion order, and bindings keep insertion order within
/// a type. A binding appears at most once per type.
#[derive(Clone, Debug, Default)]
pub struct HandlerMap {
    entries: Vec<(EventType, Vec<HandlerBinding>)>,
}

impl HandlerMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding under its declared event type.
    ///
    /// Returns `false` if the binding was already present.
    pub fn insert(&mut self, binding: HandlerBinding) -> bool {
        let event_type = binding.event_type();
        match self.entries.iter_mut().find(|(ty, _)| *ty == event_type) {
            Some((_, bindings)) if bindings.contains(&binding) => false,
            Some((_, bindings)) => {
                bindings.push(binding);
                true
            }
            None => {
                self.entries.push((event_type, vec![binding]));
                true
            }
        }
    }

    /// Bindings declared against `event_type`.
    pub fn get(&self, event_type: EventType) -> &[HandlerBinding] {
        self.entries
            .iter()
            .find(|(ty, _)| *ty == event_type)
            .map(|(_, bindings)| bindings.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over `(event type, bindings)` groups.
    pub fn iter(&self) -> impl Iterator<Item = (EventType, &[HandlerBinding])> {
        self.entries
            .iter()
            .map(|(ty, bindings)| (*ty, bindings.as_slice()))
    }

    /// Event types with at least one binding.
    pub fn event_types(&self) -> impl Iterator<Item = EventType> + '_ {
        self.entries.iter().map(|(ty, _)| *ty)
    }

    /// Total number of bindings.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, bindings)| bindings.len()).sum()
    }

    /// Returns `true` if the map holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<HandlerBinding> for HandlerMap {
    fn from_iter<I: IntoIterator<Item = HandlerBinding>>(iter: I) -> Self {
        let mut map = HandlerMap::new();
        for binding in iter {
            map.insert(binding);
        }
        map
    }
}
