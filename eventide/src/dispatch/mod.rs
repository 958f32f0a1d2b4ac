//! # Dispatch
//!
//! Resolves a posted event to the handler bindings of its type and every
//! supertype, then hands them to a [`DispatchStrategy`].
//!
//! | Strategy | Nested `post` | Cross-thread `post` |
//! |----------|---------------|---------------------|
//! | [`ImmediateDispatch`] | delivered inside the posting handler | runs on the posting thread |
//! | [`QueuedDispatch`] | appended, runs after pending work | drained by the posting thread before `post` returns |

mod immediate;
mod queued;
mod strategy;

pub use immediate::ImmediateDispatch;
pub use queued::QueuedDispatch;
pub use strategy::DispatchStrategy;

use crate::{bus::EventBus, config::DispatchMode, dead::DeadEvent};
use eventide_core::{ErrorSink, Event, HandlerBinding};
use eventide_std::{HandlerRegistry, TypeHierarchyCache};
use std::{fmt, sync::Arc};

/// Routes posted events to registered bindings.
pub(crate) struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    hierarchy: TypeHierarchyCache,
    strategy: Box<dyn DispatchStrategy>,
    sink: Arc<dyn ErrorSink>,
    mode: DispatchMode,
}

impl Dispatcher {
    pub(crate) fn new(
        registry: Arc<HandlerRegistry>,
        mode: DispatchMode,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        let strategy: Box<dyn DispatchStrategy> = match mode {
            DispatchMode::Immediate => Box::new(ImmediateDispatch),
            DispatchMode::Queued => Box::new(QueuedDispatch::new()),
        };
        Self {
            registry,
            hierarchy: TypeHierarchyCache::new(),
            strategy,
            sink,
            mode,
        }
    }

    pub(crate) fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Every binding `event` should reach, grouped by type in flattened order.
    ///
    /// A binding registered under two types in the hierarchy appears twice.
    pub(crate) fn resolve(&self, event: &dyn Event) -> Vec<HandlerBinding> {
        let flattened = self.hierarchy.flatten(event.event_type());
        self.registry.resolve(&flattened)
    }

    pub(crate) fn post(&self, source: &EventBus, event: Arc<dyn Event>) {
        let bindings = self.resolve(event.as_ref());

        if bindings.is_empty() {
            if event.is::<DeadEvent>() {
                tracing::trace!(bus = %source.identifier(), "dead event had no handlers");
                return;
            }
            tracing::trace!(
                bus = %source.identifier(),
                event_type = %event.event_type(),
                "no handlers, posting dead event"
            );
            let dead: Arc<dyn Event> = Arc::new(DeadEvent::new(source.clone(), event));
            self.post(source, dead);
            return;
        }

        tracing::trace!(
            bus = %source.identifier(),
            event_type = %event.event_type(),
            handlers = bindings.len(),
            mode = %self.mode,
            "dispatching event"
        );
        for binding in bindings {
            self.strategy.enqueue(&event, binding, self.sink.as_ref());
        }
        self.strategy.drain(self.sink.as_ref());
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mode", &self.mode)
            .field("cached_types", &self.hierarchy.len())
            .finish_non_exhaustive()
    }
}
