//! Breadth-first delivery through per-thread FIFO queues.
//!
//! Each posting thread owns its own queue on the bus. The outermost `post`
//! on a thread drains that thread's queue; nested posts from handlers only
//! append. A `post` from another thread never waits on, or hands work to, a
//! drain already running elsewhere, so every `post` has delivered its own
//! bindings by the time it returns.

use super::strategy::{DispatchStrategy, deliver};
use eventide_core::{ErrorSink, Event, HandlerBinding};
use parking_lot::Mutex;
use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::Arc,
    thread::{self, ThreadId},
};

/// A queued dispatch strategy.
///
/// Bindings are appended to the posting thread's FIFO queue. The first
/// `drain` call on a thread takes ownership of that thread's queue and
/// delivers until it is empty, including bindings appended meanwhile by
/// nested posts; a nested `drain` on the same thread returns at once.
#[derive(Default)]
pub struct QueuedDispatch {
    queues: Mutex<HashMap<ThreadId, ThreadQueue>>,
}

#[derive(Default)]
struct ThreadQueue {
    pending: VecDeque<(Arc<dyn Event>, HandlerBinding)>,
    draining: bool,
}

impl QueuedDispatch {
    /// Create an idle, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of deliveries waiting in the calling thread's queue.
    pub fn pending(&self) -> usize {
        self.queues
            .lock()
            .get(&thread::current().id())
            .map_or(0, |queue| queue.pending.len())
    }

    /// Returns `true` while the calling thread is draining its queue.
    pub fn is_draining(&self) -> bool {
        self.queues
            .lock()
            .get(&thread::current().id())
            .is_some_and(|queue| queue.draining)
    }

    /// Pop the next delivery for `owner`, dropping its queue once empty.
    fn next(&self, owner: ThreadId) -> Option<(Arc<dyn Event>, HandlerBinding)> {
        let mut queues = self.queues.lock();
        let next = queues
            .get_mut(&owner)
            .and_then(|queue| queue.pending.pop_front());
        if next.is_none() {
            queues.remove(&owner);
        }
        next
    }
}

impl DispatchStrategy for QueuedDispatch {
    fn enqueue(&self, event: &Arc<dyn Event>, binding: HandlerBinding, _sink: &dyn ErrorSink) {
        self.queues
            .lock()
            .entry(thread::current().id())
            .or_default()
            .pending
            .push_back((Arc::clone(event), binding));
    }

    fn drain(&self, sink: &dyn ErrorSink) {
        let owner = thread::current().id();
        {
            let mut queues = self.queues.lock();
            match queues.get_mut(&owner) {
                Some(queue) if !queue.draining => queue.draining = true,
                _ => return,
            }
        }

        let _guard = DrainGuard { queue: self, owner };
        while let Some((event, binding)) = self.next(owner) {
            deliver(event.as_ref(), &binding, sink);
        }
    }
}

impl fmt::Debug for QueuedDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queues = self.queues.lock();
        f.debug_struct("QueuedDispatch")
            .field("threads", &queues.len())
            .field(
                "pending",
                &queues.values().map(|q| q.pending.len()).sum::<usize>(),
            )
            .finish()
    }
}

/// Drops the owner's queue when `drain` exits.
///
/// After a normal drain the queue is already gone. If delivery unwinds, the
/// bindings still pending are discarded with it, so the next `post` on this
/// thread starts from an empty queue.
struct DrainGuard<'a> {
    queue: &'a QueuedDispatch,
    owner: ThreadId,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if let Some(abandoned) = self.queue.queues.lock().remove(&self.owner) {
            if !abandoned.pending.is_empty() {
                tracing::warn!(
                    discarded = abandoned.pending.len(),
                    "queued drain unwound, discarding pending deliveries"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventide_core::{EventType, HandlerError, HandlerMethod, IgnoreErrors, Subscriber};
    use std::{
        any::Any,
        panic::{self, AssertUnwindSafe},
        sync::{Barrier, Weak},
    };

    /// Re-enters the queue from inside its own handler.
    struct Echo {
        queue: Weak<QueuedDispatch>,
        seen: Mutex<Vec<u32>>,
        me: Mutex<Option<Weak<Echo>>>,
    }

    impl Echo {
        fn on_number(&self, event: &u32) {
            self.seen.lock().push(*event);
            if *event == 0 {
                return;
            }
            let (Some(queue), Some(me)) = (self.queue.upgrade(), self.me.lock().clone()) else {
                return;
            };
            let Some(me) = me.upgrade() else {
                return;
            };
            let next: Arc<dyn Event> = Arc::new(*event - 1);
            queue.enqueue(&next, binding(&me), &IgnoreErrors);
            assert!(queue.is_draining());
            queue.drain(&IgnoreErrors);
            assert!(
                self.seen.lock().last() == Some(event),
                "nested drain must not deliver inside the handler"
            );
        }
    }

    impl Subscriber for Echo {
        fn handler_methods(&self) -> Vec<HandlerMethod> {
            vec![HandlerMethod::typed::<Self, u32, _>("on_number", Self::on_number)]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn binding(echo: &Arc<Echo>) -> HandlerBinding {
        let method = echo.handler_methods().remove(0);
        HandlerBinding::new(echo.clone(), method, EventType::of::<u32>())
    }

    fn echo(queue: &Arc<QueuedDispatch>) -> Arc<Echo> {
        let echo = Arc::new(Echo {
            queue: Arc::downgrade(queue),
            seen: Mutex::new(Vec::new()),
            me: Mutex::new(None),
        });
        *echo.me.lock() = Some(Arc::downgrade(&echo));
        echo
    }

    #[test]
    fn drains_in_fifo_order_and_releases_ownership() {
        let queue = Arc::new(QueuedDispatch::new());
        let echo = echo(&queue);

        let first: Arc<dyn Event> = Arc::new(3u32);
        queue.enqueue(&first, binding(&echo), &IgnoreErrors);
        assert_eq!(queue.pending(), 1);
        assert!(!queue.is_draining());

        queue.drain(&IgnoreErrors);

        assert_eq!(*echo.seen.lock(), vec![3, 2, 1, 0]);
        assert_eq!(queue.pending(), 0);
        assert!(!queue.is_draining());
    }

    /// Parks inside its handler until the test releases it.
    struct Parked {
        entered: Barrier,
        release: Barrier,
        seen: Mutex<Vec<u32>>,
    }

    impl Parked {
        fn on_number(&self, event: &u32) {
            self.seen.lock().push(*event);
            if *event == 1 {
                self.entered.wait();
                self.release.wait();
            }
        }
    }

    impl Subscriber for Parked {
        fn handler_methods(&self) -> Vec<HandlerMethod> {
            vec![HandlerMethod::typed::<Self, u32, _>("on_number", Self::on_number)]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn each_thread_drains_its_own_queue() {
        let queue = QueuedDispatch::new();
        let parked = Arc::new(Parked {
            entered: Barrier::new(2),
            release: Barrier::new(2),
            seen: Mutex::new(Vec::new()),
        });
        let bind = || {
            let method = parked.handler_methods().remove(0);
            HandlerBinding::new(parked.clone(), method, EventType::of::<u32>())
        };

        thread::scope(|scope| {
            scope.spawn(|| {
                let one: Arc<dyn Event> = Arc::new(1u32);
                queue.enqueue(&one, bind(), &IgnoreErrors);
                queue.drain(&IgnoreErrors);
            });

            parked.entered.wait();
            assert!(!queue.is_draining());

            let two: Arc<dyn Event> = Arc::new(2u32);
            queue.enqueue(&two, bind(), &IgnoreErrors);
            queue.drain(&IgnoreErrors);
            let delivered = parked.seen.lock().contains(&2);
            parked.release.wait();
            assert!(delivered, "drain on a second thread must not defer to the first");
        });

        assert_eq!(queue.pending(), 0);
    }

    fn explode(_subscriber: &dyn Subscriber, _event: &dyn Event) -> Result<(), HandlerError> {
        panic!("handler failed")
    }

    /// Panics on every report, so the failure escapes `drain`.
    struct PanickingSink;

    impl ErrorSink for PanickingSink {
        fn report(&self, _event: &dyn Event, _binding: &HandlerBinding, _error: &HandlerError) {
            panic!("sink failed")
        }
    }

    #[test]
    fn unwinding_drain_resets_the_queue() {
        let queue = Arc::new(QueuedDispatch::new());
        let echo = echo(&queue);
        let faulty = || {
            let method = HandlerMethod::new(
                "tests::Echo",
                "explode",
                vec![EventType::of::<u32>()],
                explode,
            );
            HandlerBinding::new(echo.clone(), method, EventType::of::<u32>())
        };

        let event: Arc<dyn Event> = Arc::new(5u32);
        queue.enqueue(&event, faulty(), &IgnoreErrors);
        queue.enqueue(&event, faulty(), &IgnoreErrors);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| queue.drain(&PanickingSink)));

        assert!(outcome.is_err());
        assert_eq!(queue.pending(), 0);
        assert!(!queue.is_draining());

        // The queue accepts and drains new work afterwards.
        let again: Arc<dyn Event> = Arc::new(0u32);
        queue.enqueue(&again, binding(&echo), &IgnoreErrors);
        queue.drain(&IgnoreErrors);
        assert_eq!(*echo.seen.lock(), vec![0]);
    }
}
