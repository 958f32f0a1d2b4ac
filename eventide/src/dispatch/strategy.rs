//! The seam between resolving bindings and running them.

use eventide_core::{ErrorSink, Event, HandlerBinding};
use std::sync::Arc;

/// Strategy for delivering an event to its resolved bindings.
///
/// `post` hands every resolved binding to [`enqueue`](Self::enqueue) and
/// then calls [`drain`](Self::drain) once. Different execution models
/// (immediate, queued) plug in here.
pub trait DispatchStrategy: Send + Sync {
    /// Deliver, or schedule delivery of, `event` to `binding`.
    fn enqueue(&self, event: &Arc<dyn Event>, binding: HandlerBinding, sink: &dyn ErrorSink);

    /// Deliver everything scheduled so far, if this caller owns delivery.
    fn drain(&self, sink: &dyn ErrorSink);
}

/// Invoke one binding, routing any failure to `sink`.
pub(crate) fn deliver(event: &dyn Event, binding: &HandlerBinding, sink: &dyn ErrorSink) {
    if let Err(error) = binding.invoke(event) {
        sink.report(event, binding, &error);
    }
}
