//! Default handler discovery: one binding per declared handler method.

use eventide_core::{
    EventBusError, HandlerBinding, HandlerDiscovery, HandlerMap, Subscriber,
};
use std::sync::Arc;

/// Discovers handlers from [`Subscriber::handler_methods`].
///
/// Every listed method must declare exactly one event parameter; the binding
/// is keyed by that parameter's type. A single malformed method fails the
/// whole subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredHandlerFinder;

impl HandlerDiscovery for DeclaredHandlerFinder {
    fn discover(&self, subscriber: &Arc<dyn Subscriber>) -> Result<HandlerMap, EventBusError> {
        let mut found = HandlerMap::new();
        for method in subscriber.handler_methods() {
            let &[event_type] = method.params() else {
                return Err(EventBusError::MalformedHandlerSignature {
                    subscriber: method.owner(),
                    method: method.name(),
                    arity: method.params().len(),
                });
            };
            found.insert(HandlerBinding::new(subscriber.clone(), method, event_type));
        }
        Ok(found)
    }
}
