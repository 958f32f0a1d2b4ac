use eventide::{DispatchMode, EventBus, EventType, subscriber};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::{
        Arc, Barrier,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
};

mod common;
use common::{OrderEvent, OrderShipped, Ping, Pong};

const THREADS: usize = 8;
const POSTS_PER_THREAD: usize = 200;

#[derive(Default)]
struct Tally {
    pings: AtomicUsize,
}

#[subscriber]
impl Tally {
    #[subscribe]
    fn on_ping(&self, _event: &Ping) {
        self.pings.fetch_add(1, Ordering::SeqCst);
    }
}

fn concurrent_posts_are_all_delivered(mode: DispatchMode) {
    let bus = EventBus::builder().dispatch(mode).build();
    let tally = Arc::new(Tally::default());
    bus.register(tally.clone()).unwrap();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let bus = bus.clone();
            scope.spawn(move || {
                for n in 0..POSTS_PER_THREAD {
                    bus.post(Ping(n as u32));
                }
            });
        }
    });

    assert_eq!(
        tally.pings.load(Ordering::SeqCst),
        THREADS * POSTS_PER_THREAD
    );
}

#[test]
fn immediate_concurrent_posts() {
    concurrent_posts_are_all_delivered(DispatchMode::Immediate);
}

#[test]
fn queued_concurrent_posts() {
    concurrent_posts_are_all_delivered(DispatchMode::Queued);
}

/// Counts deliveries per order id across two levels of the hierarchy.
#[derive(Default)]
struct OrderHits {
    hits: Mutex<HashMap<u32, usize>>,
}

impl OrderHits {
    fn hit(&self, id: u32) {
        *self.hits.lock().entry(id).or_default() += 1;
    }
}

#[subscriber]
impl OrderHits {
    #[subscribe]
    fn on_shipped(&self, event: &OrderShipped) {
        self.hit(event.order.id);
    }

    #[subscribe]
    fn on_order(&self, event: &OrderEvent) {
        self.hit(event.id);
    }
}

#[test]
fn posts_see_all_or_none_of_a_registration() {
    const POSTS: u32 = 20_000;

    let bus = EventBus::new();
    let steady = Arc::new(Tally::default());
    bus.register(steady.clone()).unwrap();
    let churn = Arc::new(OrderHits::default());
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        scope.spawn(|| {
            while !done.load(Ordering::SeqCst) {
                bus.register(churn.clone()).unwrap();
                bus.unregister(churn.clone()).unwrap();
            }
        });
        scope.spawn(|| {
            for id in 0..POSTS {
                bus.post(OrderShipped::new(id));
                bus.post(Ping(id));
            }
            done.store(true, Ordering::SeqCst);
        });
    });

    let torn: Vec<_> = churn
        .hits
        .lock()
        .iter()
        .filter(|(_, count)| **count != 2)
        .map(|(id, count)| (*id, *count))
        .collect();
    assert!(torn.is_empty(), "posts reached part of a registration: {torn:?}");
    assert_eq!(steady.pings.load(Ordering::SeqCst), POSTS as usize);
    assert_eq!(bus.handler_count(EventType::of::<Ping>()), 1);
    assert_eq!(bus.handler_count(EventType::of::<OrderEvent>()), 0);
}

/// Blocks inside its ping handler until released.
struct Gate {
    entered: Barrier,
    release: Barrier,
    pongs: AtomicUsize,
}

#[subscriber]
impl Gate {
    #[subscribe]
    fn on_ping(&self, _event: &Ping) {
        self.entered.wait();
        self.release.wait();
    }

    #[subscribe]
    fn on_pong(&self, _event: &Pong) {
        self.pongs.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn queued_post_from_another_thread_delivers_before_returning() {
    let bus = EventBus::builder().dispatch(DispatchMode::Queued).build();
    let gate = Arc::new(Gate {
        entered: Barrier::new(2),
        release: Barrier::new(2),
        pongs: AtomicUsize::new(0),
    });
    bus.register(gate.clone()).unwrap();

    thread::scope(|scope| {
        scope.spawn(|| bus.post(Ping(1)));

        // The other thread is now draining, parked inside `on_ping`.
        gate.entered.wait();
        bus.post(Pong(1));
        let delivered = gate.pongs.load(Ordering::SeqCst);
        gate.release.wait();

        assert_eq!(delivered, 1, "post(Pong) returned before its handler ran");
    });
}
