//! Procedural macros for `eventide`.
//!
//! - `#[derive(Event)]` declares a type's place in the event type graph.
//! - `#[subscriber]` turns the `#[subscribe]` methods of an impl block into
//!   a `Subscriber` implementation.

use proc_macro::TokenStream;

mod event;
mod subscriber;

/// Derive `Hierarchy`, and through it `Event`, for a struct or enum.
///
/// Direct supertypes come in two kinds:
///
/// - `#[event(supertypes(A))]` names a supertype whose data the event
///   carries. Each needs a field of exactly that type marked
///   `#[event(parent)]`, through which `fn(&self, &A)` handlers view the
///   event. A listed supertype without such a field, or a parent field whose
///   type is not listed, is a compile error.
/// - `#[event(markers(M))]` names a data-less supertype. Handlers reach it
///   as `#[subscribe(M)] fn(&self, &dyn Event)`.
///
/// ```rust,ignore
/// #[derive(Debug, Event)]
/// #[event(supertypes(OrderEvent), markers(Auditable))]
/// struct OrderShipped {
///     #[event(parent)]
///     order: OrderEvent,
///     carrier: String,
/// }
/// ```
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::derive_event_impl(input)
}

/// Implement `Subscriber` for the self type of an inherent impl block.
///
/// Every method marked `#[subscribe]` becomes a handler. A handler takes
/// `&self` and exactly one event reference:
///
/// - `fn(&self, event: &T)` is declared against `T`.
/// - `fn(&self, event: &dyn Event)` is declared against `AnyEvent`, or
///   against `M` when written `#[subscribe(M)]`.
///
/// ```rust,ignore
/// #[subscriber]
/// impl Audit {
///     #[subscribe]
///     fn on_order(&self, event: &OrderPlaced) { /* ... */ }
///
///     #[subscribe(Auditable)]
///     fn on_auditable(&self, event: &dyn Event) { /* ... */ }
/// }
/// ```
#[proc_macro_attribute]
pub fn subscriber(attr: TokenStream, item: TokenStream) -> TokenStream {
    subscriber::subscriber_impl(attr, item)
}

/// Marks a handler method. Only meaningful inside a `#[subscriber]` impl.
#[proc_macro_attribute]
pub fn subscribe(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = proc_macro2::TokenStream::from(item);
    let error = syn::Error::new(
        proc_macro2::Span::call_site(),
        "`#[subscribe]` must be used on a method inside a `#[subscriber]` impl block",
    )
    .to_compile_error();
    TokenStream::from(quote::quote! {
        #error
        #item
    })
}
