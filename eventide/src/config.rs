//! Bus configuration and builder.

use crate::bus::EventBus;
use eventide_core::{ErrorSink, HandlerDiscovery};
use std::{fmt, sync::Arc};

/// How resolved handler bindings are invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Invoke every binding synchronously, in resolution order, before
    /// `post` returns. Events posted from a handler are delivered inside
    /// that handler's call.
    #[default]
    Immediate,

    /// Append bindings to the posting thread's FIFO queue, drained by that
    /// thread's outermost `post`. Events posted from a handler run after
    /// every binding already pending.
    Queued,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Immediate => f.write_str("immediate"),
            DispatchMode::Queued => f.write_str("queued"),
        }
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Name of the bus, attached to log lines.
    pub identifier: String,

    /// Dispatch discipline.
    pub dispatch: DispatchMode,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            identifier: "default".to_owned(),
            dispatch: DispatchMode::default(),
        }
    }
}

/// Event bus builder.
///
/// # Example
///
/// ```rust
/// use eventide::{DispatchMode, EventBus};
///
/// let bus = EventBus::builder()
///     .identifier("orders")
///     .dispatch(DispatchMode::Queued)
///     .build();
///
/// assert_eq!(bus.identifier(), "orders");
/// assert_eq!(bus.dispatch_mode(), DispatchMode::Queued);
/// ```
#[derive(Default)]
pub struct EventBusBuilder {
    pub(crate) config: EventBusConfig,
    pub(crate) sink: Option<Arc<dyn ErrorSink>>,
    pub(crate) discovery: Option<Box<dyn HandlerDiscovery>>,
}

impl EventBusBuilder {
    /// Create new event bus builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: EventBusConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the bus identifier.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.config.identifier = identifier.into();
        self
    }

    /// Set the dispatch discipline.
    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.config.dispatch = mode;
        self
    }

    /// Route handler failures to `sink` instead of the log.
    pub fn error_sink(mut self, sink: impl ErrorSink) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Replace the handler discovery strategy.
    pub fn discovery(mut self, discovery: impl HandlerDiscovery + 'static) -> Self {
        self.discovery = Some(Box::new(discovery));
        self
    }

    /// Build the event bus
    pub fn build(self) -> EventBus {
        EventBus::from_builder(self)
    }
}

impl fmt::Debug for EventBusBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBusBuilder")
            .field("config", &self.config)
            .field("custom_sink", &self.sink.is_some())
            .field("custom_discovery", &self.discovery.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EventBusConfig::default();
        assert_eq!(config.identifier, "default");
        assert_eq!(config.dispatch, DispatchMode::Immediate);
    }

    #[test]
    fn builder_overrides_config() {
        let builder = EventBusBuilder::from_config(EventBusConfig::default())
            .identifier("audit")
            .dispatch(DispatchMode::Queued);
        assert_eq!(builder.config.identifier, "audit");
        assert_eq!(builder.config.dispatch, DispatchMode::Queued);
        assert_eq!(DispatchMode::Queued.to_string(), "queued");
    }
}
