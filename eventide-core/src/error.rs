//! Error types for Eventide.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`EventBusError`] - Errors returned by `register` / `unregister`
//! - [`HandlerError`] - Errors from individual handler invocations

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a `register` or `unregister` call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventBusError {
    /// The registry does not hold every binding of the subscriber.
    #[error("missing event handler for a subscribed method, is `{subscriber}` registered?")]
    UnknownSubscriber {
        /// Type name of the subscriber.
        subscriber: &'static str,
    },

    /// A handler method does not take exactly one event parameter.
    #[error(
        "method `{subscriber}::{method}` is marked as a handler but takes {arity} event parameters, expected exactly 1"
    )]
    MalformedHandlerSignature {
        /// Type name of the subscriber.
        subscriber: &'static str,
        /// Name of the offending method.
        method: &'static str,
        /// Number of declared event parameters.
        arity: usize,
    },
}

/// Errors raised while invoking a single handler binding.
///
/// These are isolated per binding: they are reported to the bus's
/// [`ErrorSink`](crate::ErrorSink) and never returned from `post`.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Failed(#[source] BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// The event could not be viewed as the handler's parameter type.
    #[error("event of type `{actual}` cannot be viewed as `{expected}`")]
    EventMismatch {
        /// The declared parameter type.
        expected: &'static str,
        /// The runtime type of the posted event.
        actual: &'static str,
    },

    /// The binding's target is not of the type its method was declared on.
    #[error("handler target is not a `{expected}`")]
    SubscriberMismatch {
        /// The type the method was declared on.
        expected: &'static str,
    },
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        HandlerError::Failed(err)
    }
}
