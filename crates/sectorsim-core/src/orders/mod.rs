//! Order execution - per-entity queues of tagged intents.
//!
//! Each tick the head order of every queue is dispatched to the handler for
//! its kind. A handler either leaves the order pending, completes it, or
//! fails; failed orders are logged and popped so a queue never stalls.
//! Handlers apply their side effects all at once within a tick, so popping
//! or cancelling an order never leaves a half-done transfer behind.

mod handlers;
mod movement;

pub use handlers::*;
pub use movement::{approach, undock};

pub use crate::components::{Order, OrderKind};

use crate::components::{EntityId, Mining, Orders};
use crate::error::Result;
use crate::events::{EventBus, SimEvent};
use crate::index::IndexId;
use crate::sim::SimContext;
use crate::store::EntityStore;

/// Append an order to the back of the queue
pub fn enqueue(store: &mut EntityStore, id: EntityId, order: Order) -> Result<()> {
    log::debug!("{id}: queued {}", order.kind());
    store.component_mut::<Orders>(id)?.queue.push_back(order);
    Ok(())
}

/// Put an order in front of the queue, making it the active one
pub fn enqueue_front(store: &mut EntityStore, id: EntityId, order: Order) -> Result<()> {
    log::debug!("{id}: queued {} in front", order.kind());
    store.component_mut::<Orders>(id)?.queue.push_front(order);
    Ok(())
}

/// Cancel the order at `index`. Out-of-range indices (including any index
/// into an empty queue) are a no-op. Cancelling an active mine order stops
/// the mining laser.
pub fn remove_order(
    store: &mut EntityStore,
    events: &mut EventBus<SimEvent>,
    id: EntityId,
    index: usize,
) -> Result<Option<Order>> {
    let Some(order) = store.component_mut::<Orders>(id)?.queue.remove(index) else {
        return Ok(None);
    };

    if index == 0 {
        if let Order::Mine { target } = order {
            stop_mining(store, events, id, target);
        }
    }
    Ok(Some(order))
}

/// Cancel every pending order, head first
pub fn clear_orders(store: &mut EntityStore, events: &mut EventBus<SimEvent>, id: EntityId) -> Result<()> {
    while remove_order(store, events, id, 0)?.is_some() {}
    Ok(())
}

/// Shut off mining equipment aimed at `target`, if any
pub(crate) fn stop_mining(store: &mut EntityStore, events: &mut EventBus<SimEvent>, id: EntityId, target: EntityId) {
    let Ok(mining) = store.component_mut::<Mining>(id) else {
        return;
    };
    if mining.target == Some(target) {
        mining.target = None;
        mining.buffer = 0.0;
        events.publish(&SimEvent::MiningStopped { id, target });
    }
}

/// Progress reported by an order handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Keep the order at the head of the queue
    Pending,
    /// Pop the order
    Complete,
}

/// Advance the head order of every entity in `index`
pub fn order_system(ctx: &mut SimContext<'_>, index: IndexId) {
    for id in ctx.store.index(index).ids() {
        // earlier entities may have destroyed this one during the tick
        let Ok(orders) = ctx.store.component::<Orders>(id) else {
            continue;
        };
        let Some(order) = orders.head().cloned() else {
            continue;
        };
        drop(orders);

        match handler_for(order.kind())(ctx, id, &order) {
            Ok(OrderStatus::Pending) => {}
            Ok(OrderStatus::Complete) => {
                log::debug!("{id}: {} complete", order.kind());
                pop_head(ctx.store, id, &order);
                ctx.events.publish(&SimEvent::OrderCompleted {
                    id,
                    order: order.kind(),
                });
            }
            Err(err) => {
                log::warn!("{id}: {} order failed: {err}", order.kind());
                pop_head(ctx.store, id, &order);
                ctx.debug(format!("{id}: {} order failed: {err}", order.kind()));
                ctx.events.publish(&SimEvent::OrderFailed {
                    id,
                    order: order.kind(),
                    reason: err.to_string(),
                });
            }
        }
    }
}

/// Pop `order` if it is still the head. Unregistering a target already
/// strips the orders aimed at it, so the head may have moved on.
fn pop_head(store: &mut EntityStore, id: EntityId, order: &Order) {
    if let Ok(orders) = store.component_mut::<Orders>(id) {
        if orders.head() == Some(order) {
            orders.queue.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::*;
    use crate::events::SimEventKind;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_remove_order_on_empty_queue_is_noop() {
        let mut store = EntityStore::new();
        let mut events = EventBus::new();
        let id = store.create((Orders::new(),));

        assert_eq!(remove_order(&mut store, &mut events, id, 0).unwrap(), None);
        assert_eq!(remove_order(&mut store, &mut events, id, 7).unwrap(), None);
        clear_orders(&mut store, &mut events, id).unwrap();
        assert!(store.component::<Orders>(id).unwrap().is_empty());
    }

    #[test]
    fn test_enqueue_front_takes_priority() {
        let mut store = EntityStore::new();
        let id = store.create((Orders::new(),));
        enqueue(&mut store, id, Order::Hold { until: None }).unwrap();
        enqueue_front(&mut store, id, Order::Move { position: Vec2::ZERO }).unwrap();

        let orders = store.component::<Orders>(id).unwrap();
        assert_eq!(orders.head(), Some(&Order::Move { position: Vec2::ZERO }));
        assert_eq!(orders.len(), 2);
    }

    #[test]
    fn test_enqueue_requires_orders_component() {
        let mut store = EntityStore::new();
        let id = store.create((Name::new("rock"),));
        assert!(enqueue(&mut store, id, Order::Hold { until: None }).is_err());
    }

    #[test]
    fn test_cancelling_active_mine_order_stops_mining() {
        let mut store = EntityStore::new();
        let mut events = EventBus::<SimEvent>::new();
        let stopped = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stopped);
        events.subscribe(SimEventKind::MiningStopped, move |event| sink.lock().unwrap().push(event.clone()));

        let rock = store.create((Mineable::default(),));
        let mut orders = Orders::new();
        orders.queue.push_back(Order::Mine { target: rock });
        let ship = store.create((
            orders,
            Mining {
                rate: 1.0,
                buffer: 0.4,
                target: Some(rock),
            },
        ));

        let removed = remove_order(&mut store, &mut events, ship, 0).unwrap();

        assert_eq!(removed, Some(Order::Mine { target: rock }));
        let mining = store.component::<Mining>(ship).unwrap();
        assert_eq!(mining.target, None);
        assert_eq!(mining.buffer, 0.0);
        assert_eq!(
            *stopped.lock().unwrap(),
            vec![SimEvent::MiningStopped { id: ship, target: rock }]
        );
    }
}
