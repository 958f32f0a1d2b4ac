//! # Runtime Event Types
//!
//! Events are plain Rust values. Their place in the type graph is declared
//! through [`Hierarchy`]: each type lists its direct supertypes, which may be
//! other event structs (a "superclass" embedded by composition) or marker
//! types standing in for interfaces. Every type implicitly descends from
//! [`AnyEvent`], the universal root.
//!
//! [`EventType`] is the runtime identity used as a routing key. It is only
//! ever compared by `TypeId`.

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// Identity of a runtime event type.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
    supertypes: fn() -> Vec<EventType>,
}

impl EventType {
    /// The event type of `T`.
    pub fn of<T: Hierarchy + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            supertypes: T::supertypes,
        }
    }

    /// The universal root type, [`AnyEvent`].
    pub fn root() -> Self {
        Self::of::<AnyEvent>()
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this is the universal root type.
    pub fn is_root(&self) -> bool {
        self.id == TypeId::of::<AnyEvent>()
    }

    /// Direct supertypes, in declaration order.
    pub fn supertypes(&self) -> Vec<EventType> {
        (self.supertypes)()
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declares a type's position in the event type graph.
///
/// A supertype listed here receives the event in handlers declared against
/// it. Typed handlers (`fn(&S, &T)`) additionally need [`project`] to return
/// the `T` data for `TypeId::of::<T>()`; when it cannot, delivery fails with
/// [`HandlerError::EventMismatch`](crate::HandlerError::EventMismatch).
/// Marker supertypes carry no data and are reached by `&dyn Event`
/// handlers only. `#[derive(Event)]` enforces this split at compile time.
///
/// [`project`]: Hierarchy::project
///
/// # Example
///
/// ```rust
/// use eventide_core::{EventType, Hierarchy};
/// use std::any::{Any, TypeId};
///
/// /// Marker standing in for an interface.
/// struct Auditable;
/// impl Hierarchy for Auditable {}
///
/// #[derive(Debug)]
/// struct OrderEvent { id: u64 }
/// impl Hierarchy for OrderEvent {
///     fn supertypes() -> Vec<EventType> {
///         vec![EventType::of::<Auditable>()]
///     }
/// }
///
/// #[derive(Debug)]
/// struct OrderShipped { order: OrderEvent, carrier: String }
/// impl Hierarchy for OrderShipped {
///     fn supertypes() -> Vec<EventType> {
///         vec![EventType::of::<OrderEvent>()]
///     }
///
///     fn project(&self, target: TypeId) -> Option<&dyn Any> {
///         if target == TypeId::of::<Self>() {
///             return Some(self);
///         }
///         self.order.project(target)
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an event type",
    label = "missing `Hierarchy` implementation",
    note = "Derive `Event` or implement `Hierarchy` to declare the type's supertypes."
)]
pub trait Hierarchy: 'static {
    /// Direct supertypes of this type. The root is implied and need not be listed.
    fn supertypes() -> Vec<EventType> {
        Vec::new()
    }

    /// Views `self` as the type identified by `target`, if its data is
    /// reachable from this value.
    fn project(&self, target: TypeId) -> Option<&dyn Any>
    where
        Self: Sized,
    {
        (target == TypeId::of::<Self>()).then_some(self as &dyn Any)
    }
}

/// The universal root of every event type hierarchy.
///
/// Handlers registered against `AnyEvent` receive every posted event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyEvent;

impl Hierarchy for AnyEvent {}

/// An object-safe view of a posted event.
///
/// Implemented for every `Hierarchy + Send + Sync + Debug` type; there is no
/// need to implement it by hand.
pub trait Event: Any + Send + Sync + fmt::Debug {
    /// The concrete runtime type of this event.
    fn event_type(&self) -> EventType;

    /// Upcast to `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Object-safe form of [`Hierarchy::project`].
    fn as_supertype(&self, target: TypeId) -> Option<&dyn Any>;
}

impl<T> Event for T
where
    T: Hierarchy + Send + Sync + fmt::Debug,
{
    fn event_type(&self) -> EventType {
        EventType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_supertype(&self, target: TypeId) -> Option<&dyn Any> {
        Hierarchy::project(self, target)
    }
}

impl dyn Event {
    /// Returns `true` if the concrete type is `T`.
    pub fn is<T: Event>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to the concrete type `T`.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Views the event as `T`, which may be the concrete type or a
    /// supertype embedded in it.
    pub fn view<T: Event>(&self) -> Option<&T> {
        self.as_supertype(TypeId::of::<T>())?.downcast_ref::<T>()
    }
}

macro_rules! leaf_events {
    ($($ty:ty),* $(,)?) => {
        $(impl Hierarchy for $ty {})*
    };
}

leaf_events!(
    (),
    bool,
    char,
    String,
    &'static str,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
);
