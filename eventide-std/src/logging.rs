//! Logging sink for handler failures.

use eventide_core::{ErrorSink, Event, HandlerBinding, HandlerError};

/// An [`ErrorSink`] that logs every failure through `tracing`.
///
/// # Example
///
/// ```rust
/// use eventide_std::logging::LoggingSink;
///
/// // Failures are logged with `bus = "orders"`.
/// let sink = LoggingSink::named("orders");
/// assert_eq!(sink.name(), "orders");
/// ```
#[derive(Debug, Clone)]
pub struct LoggingSink {
    name: String,
}

impl LoggingSink {
    /// Create a sink for the bus named `"default"`.
    pub fn new() -> Self {
        Self::named("default")
    }

    /// Create a sink for the bus named `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The bus name attached to every log line.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for LoggingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorSink for LoggingSink {
    fn report(&self, event: &dyn Event, binding: &HandlerBinding, error: &HandlerError) {
        tracing::error!(
            bus = %self.name,
            event_type = %event.event_type(),
            handler = %binding,
            ?event,
            %error,
            "could not dispatch event"
        );
    }
}
