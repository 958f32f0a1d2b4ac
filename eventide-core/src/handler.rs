//! # Handler Methods and Bindings
//!
//! A [`HandlerMethod`] describes one handling method of a subscriber type:
//! its name, its declared parameter types and a type-erased call. A
//! [`HandlerBinding`] ties such a method to one live subscriber instance and
//! the event type it was declared against. Bindings are what the registry
//! stores and the dispatcher invokes.

use crate::{
    error::{BoxError, HandlerError},
    event::{Event, EventType, Hierarchy},
    subscriber::Subscriber,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

/// Type-erased call of a handler method.
pub type MethodCall =
    dyn Fn(&dyn Subscriber, &dyn Event) -> Result<(), HandlerError> + Send + Sync;

/// Values a handler method may return.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid handler return type",
    label = "handlers must return `()` or `Result<(), E>`",
    note = "The error type must convert into `BoxError`."
)]
pub trait HandlerOutput {
    /// Convert into the handler's outcome.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl HandlerOutput for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> HandlerOutput for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// Descriptor of a single handling method on a subscriber type.
#[derive(Clone)]
pub struct HandlerMethod {
    owner: &'static str,
    name: &'static str,
    params: Vec<EventType>,
    call: Arc<MethodCall>,
}

impl HandlerMethod {
    /// Describe a method with an arbitrary parameter list.
    ///
    /// Discovery rejects descriptors that do not declare exactly one
    /// parameter.
    pub fn new<F>(owner: &'static str, name: &'static str, params: Vec<EventType>, call: F) -> Self
    where
        F: Fn(&dyn Subscriber, &dyn Event) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self {
            owner,
            name,
            params,
            call: Arc::new(call),
        }
    }

    /// Describe `fn(&S, &E) -> R`, declared against `E`.
    ///
    /// Events of a subtype of `E` are passed through `view::<E>()`,
    /// so `E` must be reachable by projection from the posted event.
    pub fn typed<S, E, R>(name: &'static str, method: fn(&S, &E) -> R) -> Self
    where
        S: Subscriber,
        E: Hierarchy + Event,
        R: HandlerOutput + 'static,
    {
        Self::new(
            std::any::type_name::<S>(),
            name,
            vec![EventType::of::<E>()],
            move |subscriber, event| {
                let target = downcast_target::<S>(subscriber)?;
                let view = event
                    .view::<E>()
                    .ok_or_else(|| HandlerError::EventMismatch {
                        expected: std::any::type_name::<E>(),
                        actual: event.event_type().name(),
                    })?;
                method(target, view).into_outcome().map_err(HandlerError::Failed)
            },
        )
    }

    /// Describe `fn(&S, &dyn Event) -> R`, declared against `event_type`.
    ///
    /// Used for handlers on marker types and on [`AnyEvent`](crate::AnyEvent).
    pub fn erased<S, R>(
        name: &'static str,
        event_type: EventType,
        method: fn(&S, &dyn Event) -> R,
    ) -> Self
    where
        S: Subscriber,
        R: HandlerOutput + 'static,
    {
        Self::new(
            std::any::type_name::<S>(),
            name,
            vec![event_type],
            move |subscriber, event| {
                let target = downcast_target::<S>(subscriber)?;
                method(target, event).into_outcome().map_err(HandlerError::Failed)
            },
        )
    }

    /// Type name of the subscriber declaring the method.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// The method name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared event parameter types.
    pub fn params(&self) -> &[EventType] {
        &self.params
    }
}

impl fmt::Debug for HandlerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerMethod")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn downcast_target<S: Subscriber>(subscriber: &dyn Subscriber) -> Result<&S, HandlerError> {
    subscriber
        .as_any()
        .downcast_ref::<S>()
        .ok_or(HandlerError::SubscriberMismatch {
            expected: std::any::type_name::<S>(),
        })
}

/// A subscriber's ability to handle events of one declared type.
///
/// Two bindings are equal iff they refer to the same subscriber allocation,
/// the same method and the same declared event type. Bindings are immutable.
#[derive(Clone)]
pub struct HandlerBinding {
    target: Arc<dyn Subscriber>,
    method: HandlerMethod,
    event_type: EventType,
}

impl HandlerBinding {
    /// Bind `method` to `target` for `event_type`.
    pub fn new(target: Arc<dyn Subscriber>, method: HandlerMethod, event_type: EventType) -> Self {
        Self {
            target,
            method,
            event_type,
        }
    }

    /// The bound subscriber.
    pub fn target(&self) -> &Arc<dyn Subscriber> {
        &self.target
    }

    /// The bound method.
    pub fn method(&self) -> &HandlerMethod {
        &self.method
    }

    /// The event type the method was declared against.
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Type name of the bound subscriber.
    pub fn subscriber_name(&self) -> &'static str {
        self.method.owner
    }

    /// Invoke the handler, isolating errors and panics.
    pub fn invoke(&self, event: &dyn Event) -> Result<(), HandlerError> {
        match catch_unwind(AssertUnwindSafe(|| (self.method.call)(&*self.target, event))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    fn target_addr(&self) -> *const () {
        Arc::as_ptr(&self.target).cast::<()>()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

impl PartialEq for HandlerBinding {
    fn eq(&self, other: &Self) -> bool {
        self.target_addr() == other.target_addr()
            && self.method.name == other.method.name
            && self.event_type == other.event_type
    }
}

impl Eq for HandlerBinding {}

impl Hash for HandlerBinding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target_addr().hash(state);
        self.method.name.hash(state);
        self.event_type.hash(state);
    }
}

impl fmt::Display for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}({})",
            self.method.owner, self.method.name, self.event_type
        )
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("target", &self.target_addr())
            .field("method", &self.method.name)
            .field("event_type", &self.event_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        any::Any,
        sync::atomic::{AtomicUsize, Ordering},
    };

    #[derive(Default)]
    struct Counter {
        seen: AtomicUsize,
    }

    impl Counter {
        fn on_u32(&self, event: &u32) {
            self.seen.fetch_add(*event as usize, Ordering::SeqCst);
        }

        fn on_anything(&self, _event: &dyn Event) -> Result<(), std::io::Error> {
            Err(std::io::Error::other("rejected"))
        }

        fn on_bool(&self, _event: &bool) {
            panic!("boom");
        }
    }

    impl Subscriber for Counter {
        fn handler_methods(&self) -> Vec<HandlerMethod> {
            vec![
                HandlerMethod::typed::<Self, u32, _>("on_u32", Self::on_u32),
                HandlerMethod::erased::<Self, _>("on_anything", EventType::root(), Self::on_anything),
                HandlerMethod::typed::<Self, bool, _>("on_bool", Self::on_bool),
            ]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn bind(target: &Arc<Counter>, index: usize) -> HandlerBinding {
        let method = target.handler_methods().swap_remove(index);
        let event_type = method.params()[0];
        HandlerBinding::new(target.clone(), method, event_type)
    }

    #[test]
    fn typed_binding_invokes_method() {
        let counter = Arc::new(Counter::default());
        let binding = bind(&counter, 0);
        binding.invoke(&5u32).unwrap();
        assert_eq!(counter.seen.load(Ordering::SeqCst), 5);
        assert_eq!(binding.event_type(), EventType::of::<u32>());
    }

    #[test]
    fn typed_binding_rejects_foreign_event() {
        let counter = Arc::new(Counter::default());
        let err = bind(&counter, 0).invoke(&"text").unwrap_err();
        assert!(matches!(err, HandlerError::EventMismatch { .. }));
    }

    #[test]
    fn handler_error_is_returned() {
        let counter = Arc::new(Counter::default());
        let err = bind(&counter, 1).invoke(&1u8).unwrap_err();
        assert_eq!(err.to_string(), "handler failed: rejected");
    }

    #[test]
    fn panic_is_caught() {
        let counter = Arc::new(Counter::default());
        let err = bind(&counter, 2).invoke(&true).unwrap_err();
        match err {
            HandlerError::Panicked(message) => assert_eq!(message, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn equality_tracks_target_identity() {
        let first = Arc::new(Counter::default());
        let second = Arc::new(Counter::default());
        assert_eq!(bind(&first, 0), bind(&first, 0));
        assert_ne!(bind(&first, 0), bind(&second, 0));
        assert_ne!(bind(&first, 0), bind(&first, 1));
    }

    #[test]
    fn display_names_method_and_type() {
        let counter = Arc::new(Counter::default());
        let text = bind(&counter, 0).to_string();
        assert!(text.ends_with("Counter::on_u32(u32)"), "{text}");
    }
}
