//! Registry of handler bindings keyed by declared event type.
//!
//! Each type maps to an immutable, shared slice of bindings. Mutations build
//! a new slice and swap it in under the write lock, so a reader holding a
//! slice from [`HandlerRegistry::get`] keeps seeing a complete snapshot while
//! later readers see the new state.

use eventide_core::{EventBusError, EventType, HandlerBinding, HandlerMap};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

/// Mapping from event type to the bindings registered for exactly that type.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<EventType, Arc<[HandlerBinding]>>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `bindings` into the registry.
    ///
    /// Existing bindings for a type are kept; bindings already present are
    /// not added twice.
    pub fn put_all(&self, bindings: &HandlerMap) {
        let mut handlers = self.handlers.write();
        for (event_type, incoming) in bindings.iter() {
            let current = handlers.get(&event_type).map_or(&[][..], |b| &b[..]);
            let mut merged = current.to_vec();
            for binding in incoming {
                if !merged.contains(binding) {
                    merged.push(binding.clone());
                }
            }
            handlers.insert(event_type, merged.into());
        }
    }

    /// Snapshot of the bindings registered for exactly `event_type`.
    pub fn get(&self, event_type: EventType) -> Arc<[HandlerBinding]> {
        self.handlers
            .read()
            .get(&event_type)
            .cloned()
            .unwrap_or_else(|| Arc::from([]))
    }

    /// Bindings for every type in `types`, concatenated in that order.
    ///
    /// All types are read under one lock, so the result never mixes state
    /// from before and after a concurrent `put_all` or `remove_all`.
    pub fn resolve(&self, types: &[EventType]) -> Vec<HandlerBinding> {
        let handlers = self.handlers.read();
        types
            .iter()
            .filter_map(|ty| handlers.get(ty))
            .flat_map(|bindings| bindings.iter().cloned())
            .collect()
    }

    /// Remove exactly `bindings` from the registry.
    ///
    /// Either every binding is removed or, if any of them is not currently
    /// registered, nothing is and [`EventBusError::UnknownSubscriber`] is
    /// returned.
    pub fn remove_all(&self, bindings: &HandlerMap) -> Result<(), EventBusError> {
        let mut handlers = self.handlers.write();

        for (event_type, outgoing) in bindings.iter() {
            let current = handlers.get(&event_type).map_or(&[][..], |b| &b[..]);
            if let Some(missing) = outgoing.iter().find(|b| !current.contains(b)) {
                return Err(EventBusError::UnknownSubscriber {
                    subscriber: missing.subscriber_name(),
                });
            }
        }

        for (event_type, outgoing) in bindings.iter() {
            let Some(current) = handlers.get(&event_type) else {
                continue;
            };
            let remaining: Vec<HandlerBinding> = current
                .iter()
                .filter(|b| !outgoing.contains(b))
                .cloned()
                .collect();
            if remaining.is_empty() {
                handlers.remove(&event_type);
            } else {
                handlers.insert(event_type, remaining.into());
            }
        }
        Ok(())
    }

    /// Returns `true` if every binding in `bindings` is registered.
    pub fn contains_all(&self, bindings: &HandlerMap) -> bool {
        let handlers = self.handlers.read();
        bindings.iter().all(|(event_type, wanted)| {
            handlers
                .get(&event_type)
                .is_some_and(|current| wanted.iter().all(|b| current.contains(b)))
        })
    }

    /// Number of bindings registered for exactly `event_type`.
    pub fn count(&self, event_type: EventType) -> usize {
        self.handlers.read().get(&event_type).map_or(0, |b| b.len())
    }

    /// Event types with at least one registered binding.
    pub fn event_types(&self) -> Vec<EventType> {
        self.handlers.read().keys().copied().collect()
    }

    /// Returns `true` if no bindings are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}
