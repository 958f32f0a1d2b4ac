#![allow(dead_code)]

use eventide::{DeadEvent, Event, EventBus, subscriber, testing::EventLog};

// ============================================================================
// Test Event Types
// ============================================================================

/// Marker standing in for an interface.
#[derive(Event)]
pub struct Auditable;

#[derive(Clone, Debug, Event)]
#[event(markers(Auditable))]
pub struct OrderEvent {
    pub id: u32,
}

#[derive(Clone, Debug, Event)]
#[event(supertypes(OrderEvent))]
pub struct OrderShipped {
    #[event(parent)]
    pub order: OrderEvent,
    pub carrier: String,
}

#[derive(Clone, Debug, Event)]
pub struct Ping(pub u32);

#[derive(Clone, Debug, Event)]
pub struct Pong(pub u32);

impl OrderShipped {
    pub fn new(id: u32) -> Self {
        Self {
            order: OrderEvent { id },
            carrier: "post".to_owned(),
        }
    }
}

// ============================================================================
// Test Subscribers
// ============================================================================

/// Handles every level of the order hierarchy.
pub struct OrderAudit {
    pub log: EventLog,
}

#[subscriber]
impl OrderAudit {
    #[subscribe]
    fn on_shipped(&self, event: &OrderShipped) {
        self.log.push(format!("shipped:{}", event.order.id));
    }

    #[subscribe]
    fn on_order(&self, event: &OrderEvent) {
        self.log.push(format!("order:{}", event.id));
    }

    #[subscribe(Auditable)]
    fn on_auditable(&self, _event: &dyn Event) {
        self.log.push("auditable");
    }

    #[subscribe]
    fn on_any(&self, _event: &dyn Event) {
        self.log.push("any");
    }

    fn not_a_handler(&self, _event: &OrderEvent) {
        self.log.push("never");
    }
}

/// Collects dead events.
pub struct DeadLetters {
    pub log: EventLog,
    pub seen: parking_lot::Mutex<Vec<DeadEvent>>,
}

impl DeadLetters {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            seen: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

#[subscriber]
impl DeadLetters {
    #[subscribe]
    fn on_dead(&self, event: &DeadEvent) {
        self.log.push(format!("dead:{}", event.event().event_type()));
        self.seen.lock().push(event.clone());
    }
}

/// Counts pings.
pub struct PingCounter {
    pub log: EventLog,
    pub name: &'static str,
}

#[subscriber]
impl PingCounter {
    #[subscribe]
    fn on_ping(&self, event: &Ping) {
        self.log.push(format!("{}:{}", self.name, event.0));
    }
}

/// On a ping, posts a pong to the same bus, logging around the nested post.
pub struct Relay {
    pub bus: EventBus,
    pub log: EventLog,
}

#[subscriber]
impl Relay {
    #[subscribe]
    fn on_ping(&self, event: &Ping) {
        self.log.push("relay:start");
        self.bus.post(Pong(event.0));
        self.log.push("relay:end");
    }

    #[subscribe]
    fn on_pong(&self, event: &Pong) {
        self.log.push(format!("pong:{}", event.0));
    }
}
