//! Depth-first delivery on the posting thread.

use super::strategy::{DispatchStrategy, deliver};
use eventide_core::{ErrorSink, Event, HandlerBinding};
use std::sync::Arc;

/// An immediate dispatch strategy.
///
/// Invokes each binding as soon as it is enqueued, on the posting thread.
/// A failing binding is reported and the next one still runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateDispatch;

impl DispatchStrategy for ImmediateDispatch {
    fn enqueue(&self, event: &Arc<dyn Event>, binding: HandlerBinding, sink: &dyn ErrorSink) {
        deliver(event.as_ref(), &binding, sink);
    }

    fn drain(&self, _sink: &dyn ErrorSink) {}
}
