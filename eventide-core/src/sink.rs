//! Observability sink for isolated handler failures.

use crate::{error::HandlerError, event::Event, handler::HandlerBinding};

/// Receives handler failures that dispatch swallowed.
///
/// Dispatch never propagates a handler's failure to the poster; it reports
/// it here and moves on to the next binding.
pub trait ErrorSink: Send + Sync + 'static {
    /// Report that `binding` failed while handling `event`.
    fn report(&self, event: &dyn Event, binding: &HandlerBinding, error: &HandlerError);
}

impl<F> ErrorSink for F
where
    F: Fn(&dyn Event, &HandlerBinding, &HandlerError) + Send + Sync + 'static,
{
    fn report(&self, event: &dyn Event, binding: &HandlerBinding, error: &HandlerError) {
        self(event, binding, error)
    }
}

/// A sink that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreErrors;

impl ErrorSink for IgnoreErrors {
    fn report(&self, _event: &dyn Event, _binding: &HandlerBinding, _error: &HandlerError) {}
}
