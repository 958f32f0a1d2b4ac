//! Flattened type hierarchies, computed once per concrete event type.

use dashmap::DashMap;
use eventide_core::EventType;
use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

/// Caches the flattened supertype set of each concrete event type.
///
/// `TypeId`s are never reclaimed in Rust, so entries live as long as the
/// cache itself (one per bus) rather than being evicted when the type becomes
/// unreachable.
#[derive(Debug, Default)]
pub struct TypeHierarchyCache {
    flattened: DashMap<EventType, Arc<[EventType]>>,
}

impl TypeHierarchyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every type a handler for `concrete` could have been registered
    /// against: the type itself, its transitive supertypes and the root.
    ///
    /// Order is breadth first from `concrete` in declaration order, with the
    /// root last. Concurrent misses for the same type may compute the set
    /// twice; the first stored result wins.
    pub fn flatten(&self, concrete: EventType) -> Arc<[EventType]> {
        let cached = self.flattened.get(&concrete).map(|hit| Arc::clone(hit.value()));
        if let Some(hierarchy) = cached {
            return hierarchy;
        }

        let computed = Self::compute(concrete);
        Arc::clone(self.flattened.entry(concrete).or_insert(computed).value())
    }

    /// Number of cached concrete types.
    pub fn len(&self) -> usize {
        self.flattened.len()
    }

    /// Returns `true` if nothing has been flattened yet.
    pub fn is_empty(&self) -> bool {
        self.flattened.is_empty()
    }

    fn compute(concrete: EventType) -> Arc<[EventType]> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        let mut pending = VecDeque::from([concrete]);

        while let Some(ty) = pending.pop_front() {
            if ty.is_root() || !seen.insert(ty) {
                continue;
            }
            ordered.push(ty);
            pending.extend(ty.supertypes());
        }

        ordered.push(EventType::root());
        ordered.into()
    }
}
