//! Publish/subscribe channels between the simulation and its consumers.
//!
//! The bus is an ordinary value owned by the `Sim` and passed to the systems
//! that publish. Delivery is synchronous, on the publishing thread, in
//! subscription order. Nothing is queued or persisted.

use serde::{Deserialize, Serialize};

use crate::components::{Archetype, EntityId, OrderKind};

/// Event payload with a discriminant used for routing
pub trait BusEvent {
    type Kind: Copy + Eq + std::fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Token returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Handler<E> = Box<dyn FnMut(&E) + Send>;

struct Subscriber<E: BusEvent> {
    token: Subscription,
    kind: E::Kind,
    handler: Handler<E>,
}

/// Typed bus: subscribers register for one discriminant.
pub struct EventBus<E: BusEvent> {
    subscribers: Vec<Subscriber<E>>,
    next_token: u64,
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_token: 0,
        }
    }

    pub fn subscribe(&mut self, kind: E::Kind, handler: impl FnMut(&E) + Send + 'static) -> Subscription {
        let token = Subscription(self.next_token);
        self.next_token += 1;
        self.subscribers.push(Subscriber {
            token,
            kind,
            handler: Box::new(handler),
        });
        token
    }

    /// Returns whether the subscription was still active
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.token != subscription);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: &E) {
        let kind = event.kind();
        for subscriber in self.subscribers.iter_mut().filter(|s| s.kind == kind) {
            (subscriber.handler)(event);
        }
    }

    /// Drop every subscription
    pub fn reset(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.subscribers.iter().filter(|s| s.kind == kind).count()
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Untyped specialization: every subscriber receives every message.
pub struct Channel<T> {
    subscribers: Vec<(Subscription, Box<dyn FnMut(&T) + Send>)>,
    next_token: u64,
}

impl<T> Channel<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_token: 0,
        }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&T) + Send + 'static) -> Subscription {
        let token = Subscription(self.next_token);
        self.next_token += 1;
        self.subscribers.push((token, Box::new(handler)));
        token
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(token, _)| *token != subscription);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, message: &T) {
        for (_, handler) in self.subscribers.iter_mut() {
            handler(message);
        }
    }

    pub fn reset(&mut self) {
        self.subscribers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulation-originated events consumed by presentation layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimEvent {
    Spawned { id: EntityId, archetype: Archetype },
    Destroyed { id: EntityId, by: Option<EntityId> },
    ShotFired { source: EntityId, target: EntityId, damage: f64 },
    MiningStarted { id: EntityId, target: EntityId },
    MiningStopped { id: EntityId, target: EntityId },
    Docked { id: EntityId, at: EntityId },
    OwnershipTransferred { id: EntityId, from: EntityId, to: EntityId },
    OrderCompleted { id: EntityId, order: OrderKind },
    OrderFailed { id: EntityId, order: OrderKind, reason: String },
    MissionCompleted { id: EntityId, faction: EntityId },
    MissionFailed { id: EntityId, faction: EntityId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimEventKind {
    Spawned,
    Destroyed,
    ShotFired,
    MiningStarted,
    MiningStopped,
    Docked,
    OwnershipTransferred,
    OrderCompleted,
    OrderFailed,
    MissionCompleted,
    MissionFailed,
}

impl BusEvent for SimEvent {
    type Kind = SimEventKind;

    fn kind(&self) -> SimEventKind {
        match self {
            SimEvent::Spawned { .. } => SimEventKind::Spawned,
            SimEvent::Destroyed { .. } => SimEventKind::Destroyed,
            SimEvent::ShotFired { .. } => SimEventKind::ShotFired,
            SimEvent::MiningStarted { .. } => SimEventKind::MiningStarted,
            SimEvent::MiningStopped { .. } => SimEventKind::MiningStopped,
            SimEvent::Docked { .. } => SimEventKind::Docked,
            SimEvent::OwnershipTransferred { .. } => SimEventKind::OwnershipTransferred,
            SimEvent::OrderCompleted { .. } => SimEventKind::OrderCompleted,
            SimEvent::OrderFailed { .. } => SimEventKind::OrderFailed,
            SimEvent::MissionCompleted { .. } => SimEventKind::MissionCompleted,
            SimEvent::MissionFailed { .. } => SimEventKind::MissionFailed,
        }
    }
}

/// Cross-cutting diagnostics broadcast on the debug channel
#[derive(Debug, Clone, PartialEq)]
pub struct DebugEvent {
    pub time: f64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn destroyed(id: u32) -> SimEvent {
        SimEvent::Destroyed {
            id: EntityId(id),
            by: None,
        }
    }

    #[test]
    fn test_publish_reaches_matching_subscribers_in_order() {
        let mut bus = EventBus::<SimEvent>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        bus.subscribe(SimEventKind::Destroyed, move |_| first.lock().unwrap().push("first"));
        let second = Arc::clone(&seen);
        bus.subscribe(SimEventKind::Destroyed, move |_| second.lock().unwrap().push("second"));
        let other = Arc::clone(&seen);
        bus.subscribe(SimEventKind::ShotFired, move |_| other.lock().unwrap().push("shot"));

        bus.publish(&destroyed(1));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe_and_reset() {
        let mut bus = EventBus::<SimEvent>::new();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let sub = bus.subscribe(SimEventKind::Destroyed, move |_| *counter.lock().unwrap() += 1);

        bus.publish(&destroyed(1));
        assert!(bus.unsubscribe(sub));
        assert!(!bus.unsubscribe(sub));
        bus.publish(&destroyed(2));
        assert_eq!(*count.lock().unwrap(), 1);

        bus.subscribe(SimEventKind::Destroyed, |_| {});
        bus.reset();
        assert_eq!(bus.subscriber_count(SimEventKind::Destroyed), 0);
    }

    #[test]
    fn test_channel_broadcasts_to_all() {
        let mut channel = Channel::<String>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b"] {
            let log = Arc::clone(&log);
            channel.subscribe(move |msg: &String| log.lock().unwrap().push(format!("{tag}:{msg}")));
        }

        channel.publish(&"hi".to_string());
        assert_eq!(*log.lock().unwrap(), vec!["a:hi", "b:hi"]);
        channel.reset();
        assert!(channel.is_empty());
    }
}
