//! Kind-specific order handlers and their dispatch table.

use std::collections::BTreeMap;

use crate::components::*;
use crate::error::{Result, SimError};
use crate::events::SimEvent;
use crate::sim::SimContext;

use super::movement::{approach, undock};
use super::{stop_mining, OrderStatus};

/// Executes one tick of an order for the entity holding it
pub type OrderHandler = fn(&mut SimContext<'_>, EntityId, &Order) -> Result<OrderStatus>;

pub fn handler_for(kind: OrderKind) -> OrderHandler {
    match kind {
        OrderKind::Hold => hold,
        OrderKind::Move => move_to,
        OrderKind::Collect => collect,
        OrderKind::Attack => attack,
        OrderKind::Dock => dock,
        OrderKind::Mine => mine,
        OrderKind::Deliver => deliver,
    }
}

fn wrong_kind(expected: OrderKind, order: &Order) -> SimError {
    SimError::WrongOrderKind {
        expected,
        found: order.kind(),
    }
}

fn position_of(ctx: &SimContext<'_>, id: EntityId) -> Result<Vec2> {
    Ok(ctx.store.component::<Position>(id)?.coord)
}

pub fn hold(ctx: &mut SimContext<'_>, _id: EntityId, order: &Order) -> Result<OrderStatus> {
    let Order::Hold { until } = order else {
        return Err(wrong_kind(OrderKind::Hold, order));
    };
    match until {
        Some(until) if ctx.time >= *until => Ok(OrderStatus::Complete),
        _ => Ok(OrderStatus::Pending),
    }
}

pub fn move_to(ctx: &mut SimContext<'_>, id: EntityId, order: &Order) -> Result<OrderStatus> {
    let Order::Move { position } = order else {
        return Err(wrong_kind(OrderKind::Move, order));
    };
    undock(ctx.store, id)?;
    if approach(ctx.store, id, *position, 0.0, ctx.delta)? {
        Ok(OrderStatus::Complete)
    } else {
        Ok(OrderStatus::Pending)
    }
}

/// Pick up a loose container. Either the whole content moves into the
/// actor's hold and the container disappears, or nothing happens.
pub fn collect(ctx: &mut SimContext<'_>, id: EntityId, order: &Order) -> Result<OrderStatus> {
    let Order::Collect { target } = order else {
        return Err(wrong_kind(OrderKind::Collect, order));
    };
    let target = *target;
    ctx.store.require_components(id, &[ComponentKind::Position, ComponentKind::Storage])?;
    let cargo = ctx
        .store
        .require_components(
            target,
            &[ComponentKind::Collectible, ComponentKind::Storage, ComponentKind::Position],
        )?
        .component::<Storage>()?
        .stored
        .clone();

    let destination = position_of(ctx, target)?;
    if !approach(ctx.store, id, destination, ctx.config.collect_range, ctx.delta)? {
        return Ok(OrderStatus::Pending);
    }

    let needed: u64 = cargo.values().sum();
    let free = ctx.store.component::<Storage>(id)?.free();
    if needed > free {
        return Err(SimError::InsufficientCapacity { id, needed, free });
    }

    ctx.store.unregister(target)?;
    let storage = ctx.store.component_mut::<Storage>(id)?;
    for (commodity, quantity) in cargo {
        storage.add(commodity, quantity);
    }
    log::debug!("{id}: collected {needed} units from {target}");
    Ok(OrderStatus::Complete)
}

pub fn attack(ctx: &mut SimContext<'_>, id: EntityId, order: &Order) -> Result<OrderStatus> {
    let Order::Attack { target } = order else {
        return Err(wrong_kind(OrderKind::Attack, order));
    };
    let target = *target;
    let weapon = *ctx
        .store
        .require_components(id, &[ComponentKind::Position, ComponentKind::Damage])?
        .component::<Damage>()?;
    ctx.store
        .require_components(target, &[ComponentKind::Position, ComponentKind::Hitpoints])?;

    let destination = position_of(ctx, target)?;
    if !approach(ctx.store, id, destination, weapon.range, ctx.delta)? {
        return Ok(OrderStatus::Pending);
    }

    let damage = weapon.value * ctx.delta;
    let hitpoints = ctx.store.component_mut::<Hitpoints>(target)?;
    hitpoints.hp -= damage;
    let destroyed = hitpoints.is_destroyed();
    ctx.events.publish(&SimEvent::ShotFired {
        source: id,
        target,
        damage,
    });

    if !destroyed {
        return Ok(OrderStatus::Pending);
    }
    ctx.store.unregister(target)?;
    log::info!("{target} destroyed by {id}");
    ctx.events.publish(&SimEvent::Destroyed {
        id: target,
        by: Some(id),
    });
    Ok(OrderStatus::Complete)
}

pub fn dock(ctx: &mut SimContext<'_>, id: EntityId, order: &Order) -> Result<OrderStatus> {
    let Order::Dock { target } = order else {
        return Err(wrong_kind(OrderKind::Dock, order));
    };
    let target = *target;
    ctx.store
        .require_components(target, &[ComponentKind::Position, ComponentKind::DockPads])?;
    if ctx.store.cloned::<Docked>(id).map(|d| d.at) == Some(target) {
        return Ok(OrderStatus::Complete);
    }
    undock(ctx.store, id)?;

    let destination = position_of(ctx, target)?;
    if !approach(ctx.store, id, destination, ctx.config.dock_range, ctx.delta)? {
        return Ok(OrderStatus::Pending);
    }

    let pads = ctx.store.component_mut::<DockPads>(target)?;
    if !pads.has_free_pad() {
        // wait in the queue for a pad
        return Ok(OrderStatus::Pending);
    }
    insert_id(&mut pads.docked, id);
    ctx.store.insert(id, Docked { at: target })?;
    ctx.events.publish(&SimEvent::Docked { id, at: target });
    Ok(OrderStatus::Complete)
}

/// Mine whole units out of an asteroid until the hold is full or the
/// asteroid runs dry.
pub fn mine(ctx: &mut SimContext<'_>, id: EntityId, order: &Order) -> Result<OrderStatus> {
    let Order::Mine { target } = order else {
        return Err(wrong_kind(OrderKind::Mine, order));
    };
    let target = *target;
    ctx.store.require_components(
        id,
        &[ComponentKind::Position, ComponentKind::Storage, ComponentKind::Mining],
    )?;
    let deposit = *ctx
        .store
        .require_components(target, &[ComponentKind::Position, ComponentKind::Mineable])?
        .component::<Mineable>()?;

    let destination = position_of(ctx, target)?;
    if !approach(ctx.store, id, destination, ctx.config.dock_range, ctx.delta)? {
        return Ok(OrderStatus::Pending);
    }

    let delta = ctx.delta;
    let (storage, mining) = ctx.store.require_mut::<(&mut Storage, &mut Mining)>(id)?;
    let started = mining.target != Some(target);
    if started {
        mining.target = Some(target);
        mining.buffer = 0.0;
    }

    let mut mined = 0;
    if !storage.is_full() && !deposit.is_exhausted() {
        mining.buffer += mining.rate * delta;
        let whole = mining.buffer.floor();
        mining.buffer -= whole;
        mined = (whole as u64).min(deposit.remaining);
        mined = storage.add(deposit.commodity, mined);
    }
    let finished = storage.is_full() || deposit.remaining - mined == 0;

    if mined > 0 {
        ctx.store.component_mut::<Mineable>(target)?.remaining -= mined;
    }
    if started {
        ctx.events.publish(&SimEvent::MiningStarted { id, target });
    }
    if finished {
        stop_mining(ctx.store, ctx.events, id, target);
        return Ok(OrderStatus::Complete);
    }
    Ok(OrderStatus::Pending)
}

/// Unload cargo at a facility. Within a faction this is a plain transfer;
/// to a foreign facility it is a sale paid from the buyer's budget.
pub fn deliver(ctx: &mut SimContext<'_>, id: EntityId, order: &Order) -> Result<OrderStatus> {
    let Order::Deliver { target } = order else {
        return Err(wrong_kind(OrderKind::Deliver, order));
    };
    let target = *target;
    let kinds = [ComponentKind::Position, ComponentKind::Storage, ComponentKind::Owner];
    let seller = ctx.store.require_components(id, &kinds)?.component::<Owner>()?.id;
    let buyer = ctx.store.require_components(target, &kinds)?.component::<Owner>()?.id;

    let destination = position_of(ctx, target)?;
    if !approach(ctx.store, id, destination, ctx.config.dock_range, ctx.delta)? {
        return Ok(OrderStatus::Pending);
    }

    let cargo = ctx.store.component::<Storage>(id)?.stored.clone();
    let mut free = ctx.store.component::<Storage>(target)?.free();
    let mut budget = if seller == buyer {
        None
    } else {
        Some(ctx.store.component::<Budget>(buyer)?.money)
    };

    // plan the whole transfer before touching anything
    let mut plan = BTreeMap::new();
    let mut total_price = 0;
    for (commodity, amount) in cargo {
        let mut quantity = amount.min(free);
        let price = ctx.config.price(commodity);
        if let Some(money) = budget.as_mut() {
            if price > 0 {
                quantity = quantity.min((*money).max(0) as u64 / price as u64);
            }
            let cost = quantity as i64 * price;
            *money -= cost;
            total_price += cost;
        }
        if quantity > 0 {
            free -= quantity;
            plan.insert(commodity, quantity);
        }
    }
    if budget.is_some() {
        // seller's faction must be able to receive payment
        ctx.store.require_components(seller, &[ComponentKind::Budget])?;
    }

    let delivered: u64 = plan.values().sum();
    for (commodity, quantity) in &plan {
        ctx.store.component_mut::<Storage>(id)?.take(*commodity, *quantity);
        ctx.store.component_mut::<Storage>(target)?.add(*commodity, *quantity);
    }
    if budget.is_some() && total_price > 0 {
        ctx.store.component_mut::<Budget>(buyer)?.money -= total_price;
        ctx.store.component_mut::<Budget>(seller)?.money += total_price;
        log::debug!("{id}: sold {delivered} units to {target} for {total_price}");
    } else {
        log::debug!("{id}: delivered {delivered} units to {target}");
    }
    Ok(OrderStatus::Complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::events::{Channel, EventBus};
    use crate::store::EntityStore;

    struct Harness {
        store: EntityStore,
        events: EventBus<SimEvent>,
        debug: Channel<crate::events::DebugEvent>,
        config: SimConfig,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: EntityStore::new(),
                events: EventBus::new(),
                debug: Channel::new(),
                config: SimConfig::default(),
            }
        }

        fn run(&mut self, id: EntityId, order: &Order, delta: f64) -> Result<OrderStatus> {
            let mut ctx = SimContext {
                store: &mut self.store,
                events: &mut self.events,
                debug: &mut self.debug,
                config: &self.config,
                time: 0.0,
                delta,
            };
            handler_for(order.kind())(&mut ctx, id, order)
        }
    }

    #[test]
    fn test_handler_rejects_wrong_kind() {
        let mut h = Harness::new();
        let id = h.store.create((Position::new(0.0, 0.0),));
        let mut ctx = SimContext {
            store: &mut h.store,
            events: &mut h.events,
            debug: &mut h.debug,
            config: &h.config,
            time: 0.0,
            delta: 1.0,
        };

        let err = collect(&mut ctx, id, &Order::Hold { until: None }).unwrap_err();
        assert!(matches!(
            err,
            SimError::WrongOrderKind {
                expected: OrderKind::Collect,
                found: OrderKind::Hold
            }
        ));
    }

    #[test]
    fn test_hold_until() {
        let mut h = Harness::new();
        let id = h.store.create((Position::new(0.0, 0.0),));
        assert_eq!(h.run(id, &Order::Hold { until: None }, 1.0).unwrap(), OrderStatus::Pending);
        assert_eq!(h.run(id, &Order::Hold { until: Some(0.0) }, 1.0).unwrap(), OrderStatus::Complete);
    }

    #[test]
    fn test_collect_refuses_partial_transfer() {
        let mut h = Harness::new();
        let ship = h.store.create((Position::new(0.0, 0.0), Storage::new(10)));
        let crate_ = h.store.create((
            Position::new(0.5, 0.0),
            Collectible {},
            Storage::new(100).with(Commodity::Ore, 50),
        ));

        let err = h.run(ship, &Order::Collect { target: crate_ }, 1.0).unwrap_err();

        assert!(matches!(err, SimError::InsufficientCapacity { needed: 50, free: 10, .. }));
        assert!(h.store.contains(crate_));
        assert!(h.store.component::<Storage>(ship).unwrap().is_empty());
    }

    #[test]
    fn test_attack_destroys_target() {
        let mut h = Harness::new();
        let fighter = h.store.create((Position::new(0.0, 0.0), Damage::new(30.0, 5.0)));
        let drone = h.store.create((Position::new(3.0, 0.0), Hitpoints::new(50.0)));
        let order = Order::Attack { target: drone };

        assert_eq!(h.run(fighter, &order, 1.0).unwrap(), OrderStatus::Pending);
        assert_eq!(h.store.component::<Hitpoints>(drone).unwrap().hp, 20.0);
        assert_eq!(h.run(fighter, &order, 1.0).unwrap(), OrderStatus::Complete);
        assert!(!h.store.contains(drone));
    }

    #[test]
    fn test_dock_waits_for_free_pad() {
        let mut h = Harness::new();
        let station = h.store.create((Position::new(0.0, 0.0), DockPads::new(1)));
        let first = h.store.create((Position::new(1.0, 0.0),));
        let second = h.store.create((Position::new(0.0, 1.0),));
        let order = Order::Dock { target: station };

        assert_eq!(h.run(first, &order, 1.0).unwrap(), OrderStatus::Complete);
        assert_eq!(h.store.component::<Docked>(first).unwrap().at, station);
        assert_eq!(h.run(second, &order, 1.0).unwrap(), OrderStatus::Pending);
        assert!(h.store.component::<Docked>(second).is_err());
    }

    #[test]
    fn test_mine_fills_hold() {
        let mut h = Harness::new();
        let rock = h.store.create((
            Position::new(1.0, 0.0),
            Mineable {
                commodity: Commodity::Ice,
                remaining: 100,
            },
        ));
        let miner = h.store.create((Position::new(0.0, 0.0), Storage::new(5), Mining::new(2.0)));
        let order = Order::Mine { target: rock };

        assert_eq!(h.run(miner, &order, 1.0).unwrap(), OrderStatus::Pending);
        assert_eq!(h.run(miner, &order, 1.5).unwrap(), OrderStatus::Complete);

        assert_eq!(h.store.component::<Storage>(miner).unwrap().amount(Commodity::Ice), 5);
        assert_eq!(h.store.component::<Mineable>(rock).unwrap().remaining, 95);
        assert_eq!(h.store.component::<Mining>(miner).unwrap().target, None);
    }

    #[test]
    fn test_deliver_sells_to_foreign_facility() {
        let mut h = Harness::new();
        h.config.prices = BTreeMap::from([(Commodity::Ore, 10)]);
        let seller = h.store.create((Budget::new(0),));
        let buyer = h.store.create((Budget::new(250),));
        let depot = h.store.create((Position::new(0.0, 0.0), Storage::new(100), Owner { id: buyer }));
        let hauler = h.store.create((
            Position::new(0.0, 0.0),
            Storage::new(100).with(Commodity::Ore, 40),
            Owner { id: seller },
        ));

        let status = h.run(hauler, &Order::Deliver { target: depot }, 1.0).unwrap();

        assert_eq!(status, OrderStatus::Complete);
        assert_eq!(h.store.component::<Storage>(depot).unwrap().amount(Commodity::Ore), 25);
        assert_eq!(h.store.component::<Storage>(hauler).unwrap().amount(Commodity::Ore), 15);
        assert_eq!(h.store.component::<Budget>(buyer).unwrap().money, 0);
        assert_eq!(h.store.component::<Budget>(seller).unwrap().money, 250);
    }
}
