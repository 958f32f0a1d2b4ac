//! # eventide-core
//!
//! Core types and traits for the Eventide in-process event bus.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! extensions that provide their own discovery, sinks or registries without
//! pulling in the `eventide-std` implementations.
//!
//! # Vocabulary
//!
//! ## Event types ([`EventType`], [`Hierarchy`], [`Event`])
//!
//! Events are ordinary values. Each event type declares its direct
//! supertypes through [`Hierarchy`]; the bus routes a posted event to every
//! handler registered against any type in its flattened hierarchy, up to the
//! universal root [`AnyEvent`].
//!
//! ## Handlers ([`HandlerMethod`], [`HandlerBinding`])
//!
//! A handler method belongs to a [`Subscriber`]. Binding it to a live
//! subscriber instance yields a [`HandlerBinding`], the unit the registry
//! stores and the dispatcher invokes.
//!
//! ## Collaborators ([`HandlerDiscovery`], [`ErrorSink`])
//!
//! Discovery turns a subscriber into a [`HandlerMap`]. The error sink
//! receives handler failures isolated during dispatch.
//!
//! # Error Types
//!
//! - [`EventBusError`] - `register` / `unregister` failures
//! - [`HandlerError`] - Per-binding invocation failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod event;
mod handler;
mod sink;
mod subscriber;

// Re-exports
pub use error::{BoxError, EventBusError, HandlerError};
pub use event::{AnyEvent, Event, EventType, Hierarchy};
pub use handler::{HandlerBinding, HandlerMethod, HandlerOutput, MethodCall};
pub use sink::{ErrorSink, IgnoreErrors};
pub use subscriber::{HandlerDiscovery, HandlerMap, Subscriber};
