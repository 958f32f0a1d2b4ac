//! # eventide - In-process Publish/Subscribe Event Bus
//!
//! `eventide` lets components communicate by posting events to an
//! [`EventBus`] instead of holding references to one another. Subscribers
//! declare handling methods, each accepting exactly one event type; posting
//! an event invokes every handler declared for the event's concrete type or
//! any of its supertypes.
//!
//! ## Quick Start
//!
//! ```rust
//! use eventide::{Event, EventBus, subscriber};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Debug, Event)]
//! struct OrderPlaced {
//!     id: u32,
//! }
//!
//! #[derive(Default)]
//! struct Audit {
//!     seen: Mutex<Vec<u32>>,
//! }
//!
//! #[subscriber]
//! impl Audit {
//!     #[subscribe]
//!     fn on_order(&self, event: &OrderPlaced) {
//!         self.seen.lock().unwrap().push(event.id);
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let audit = Arc::new(Audit::default());
//! bus.register(audit.clone()).unwrap();
//!
//! bus.post(OrderPlaced { id: 7 });
//! assert_eq!(*audit.seen.lock().unwrap(), [7]);
//! ```
//!
//! ## Type Hierarchies
//!
//! Events form hierarchies through [`Hierarchy`]: a type names its direct
//! supertypes, and the bus delivers to handlers of the whole closure. Every
//! type descends from [`AnyEvent`], so a handler for `AnyEvent` sees every
//! event exactly once.
//!
//! ## Dispatch
//!
//! See [`DispatchMode`]. Events nobody handles come back as a [`DeadEvent`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

extern crate self as eventide;

mod bus;
mod config;
mod dead;
pub mod dispatch;

pub use bus::EventBus;
pub use config::{DispatchMode, EventBusBuilder, EventBusConfig};
pub use dead::DeadEvent;

pub use eventide_core::{
    AnyEvent,
    // Error types
    BoxError,
    // Observability
    ErrorSink,
    // Event model
    Event,
    EventBusError,
    EventType,
    // Handlers
    HandlerBinding,
    // Discovery
    HandlerDiscovery,
    HandlerError,
    HandlerMap,
    HandlerMethod,
    HandlerOutput,
    Hierarchy,
    IgnoreErrors,
    MethodCall,
    Subscriber,
};

pub use eventide_std::{
    DeclaredHandlerFinder, HandlerRegistry, TypeHierarchyCache, logging::LoggingSink,
};

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use eventide_std::testing::*;
}

/// Prelude module - common imports for eventide.
///
/// # Usage
///
/// ```rust
/// use eventide::prelude::*;
///
/// let bus = EventBus::new();
/// bus.post(42u32);
/// ```
pub mod prelude {
    pub use crate::{
        AnyEvent, DeadEvent, DispatchMode, Event, EventBus, EventBusError, Hierarchy, Subscriber,
    };

    #[cfg(feature = "macros")]
    pub use crate::subscriber;
}

#[cfg(feature = "macros")]
pub use eventide_macros::{Event, subscriber};
