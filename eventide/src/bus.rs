//! The event bus facade.

use crate::{
    config::{DispatchMode, EventBusBuilder, EventBusConfig},
    dispatch::Dispatcher,
};
use eventide_core::{Event, EventBusError, EventType, HandlerDiscovery, HandlerMap, Subscriber};
use eventide_std::{DeclaredHandlerFinder, HandlerRegistry, logging::LoggingSink};
use std::{fmt, sync::Arc};

/// Dispatches events to subscribers and lets subscribers register with
/// one another without knowing about each other.
///
/// Cloning an `EventBus` yields another handle to the same bus: clones share
/// registrations and the dispatch queue.
///
/// # Example
///
/// ```rust
/// use eventide::{EventBus, subscriber};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct Greeter {
///     greeted: Mutex<Vec<String>>,
/// }
///
/// #[subscriber]
/// impl Greeter {
///     #[subscribe]
///     fn greet(&self, name: &String) {
///         self.greeted.lock().unwrap().push(name.clone());
///     }
/// }
///
/// let bus = EventBus::new();
/// let greeter = Arc::new(Greeter::default());
/// bus.register(greeter.clone()).unwrap();
///
/// bus.post("world".to_string());
/// assert_eq!(*greeter.greeted.lock().unwrap(), ["world"]);
/// ```
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    config: EventBusConfig,
    registry: Arc<HandlerRegistry>,
    dispatcher: Dispatcher,
    discovery: Box<dyn HandlerDiscovery>,
}

impl EventBus {
    /// Create a bus named `"default"` with immediate dispatch.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a bus with the given identifier.
    pub fn named(identifier: impl Into<String>) -> Self {
        Self::builder().identifier(identifier).build()
    }

    /// Create a bus from a configuration.
    pub fn with_config(config: EventBusConfig) -> Self {
        EventBusBuilder::from_config(config).build()
    }

    /// Start building a bus.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    pub(crate) fn from_builder(builder: EventBusBuilder) -> Self {
        let EventBusBuilder {
            config,
            sink,
            discovery,
        } = builder;

        let sink = sink.unwrap_or_else(|| Arc::new(LoggingSink::named(config.identifier.clone())));
        let discovery = discovery.unwrap_or_else(|| Box::new(DeclaredHandlerFinder));
        let registry = Arc::new(HandlerRegistry::new());
        let dispatcher = Dispatcher::new(Arc::clone(&registry), config.dispatch, sink);

        Self {
            inner: Arc::new(BusInner {
                config,
                registry,
                dispatcher,
                discovery,
            }),
        }
    }

    /// Name of this bus, used in log lines.
    pub fn identifier(&self) -> &str {
        &self.inner.config.identifier
    }

    /// Dispatch discipline of this bus.
    pub fn dispatch_mode(&self) -> DispatchMode {
        self.inner.dispatcher.mode()
    }

    /// Register every handling method of `subscriber`.
    ///
    /// Registering the same subscriber twice is a no-op. Fails without
    /// changing anything if a method's signature is malformed.
    pub fn register(&self, subscriber: Arc<dyn Subscriber>) -> Result<(), EventBusError> {
        let bindings = self.discover(&subscriber)?;
        self.inner.registry.put_all(&bindings);
        tracing::debug!(
            bus = %self.identifier(),
            subscriber = bindings_owner(&bindings),
            handlers = bindings.len(),
            "registered subscriber"
        );
        Ok(())
    }

    /// Unregister every handling method of `subscriber`.
    ///
    /// Fails with [`EventBusError::UnknownSubscriber`] if any of its methods
    /// is not currently registered, in which case nothing is removed.
    pub fn unregister(&self, subscriber: Arc<dyn Subscriber>) -> Result<(), EventBusError> {
        let bindings = self.discover(&subscriber)?;
        self.inner.registry.remove_all(&bindings)?;
        tracing::debug!(
            bus = %self.identifier(),
            subscriber = bindings_owner(&bindings),
            handlers = bindings.len(),
            "unregistered subscriber"
        );
        Ok(())
    }

    /// Post `event` to every handler of its type and supertypes.
    ///
    /// Handler failures are routed to the bus's error sink and never reach
    /// the caller. An event with no handler is wrapped in a
    /// [`DeadEvent`](crate::DeadEvent) and posted again.
    pub fn post<E: Event>(&self, event: E) {
        self.post_shared(Arc::new(event));
    }

    /// Post an already shared, type-erased event.
    pub fn post_shared(&self, event: Arc<dyn Event>) {
        self.inner.dispatcher.post(self, event);
    }

    /// Number of bindings registered directly under `event_type`.
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.inner.registry.count(event_type)
    }

    /// Returns `true` if every handling method of `subscriber` is registered.
    ///
    /// A subscriber with no handling methods, or whose methods cannot be
    /// discovered, is never registered.
    pub fn is_registered(&self, subscriber: &Arc<dyn Subscriber>) -> bool {
        match self.discover(subscriber) {
            Ok(bindings) => !bindings.is_empty() && self.inner.registry.contains_all(&bindings),
            Err(_) => false,
        }
    }

    fn discover(&self, subscriber: &Arc<dyn Subscriber>) -> Result<HandlerMap, EventBusError> {
        self.inner.discovery.discover(subscriber)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for EventBus {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for EventBus {}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("identifier", &self.identifier())
            .field("dispatch", &self.dispatch_mode())
            .field("event_types", &self.inner.registry.event_types().len())
            .finish()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus({})", self.identifier())
    }
}

fn bindings_owner(bindings: &HandlerMap) -> &'static str {
    bindings
        .iter()
        .flat_map(|(_, bindings)| bindings.first())
        .map(|binding| binding.subscriber_name())
        .next()
        .unwrap_or("<no handlers>")
}
