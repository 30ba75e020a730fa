//! Auto-order system - gives idle entities something to do

use crate::components::*;
use crate::error::Result;
use crate::index::IndexId;
use crate::orders::enqueue;
use crate::sim::{SimContext, SystemIndices};
use crate::store::EntityStore;

/// Queue a default order for every entity whose queue ran dry
pub fn auto_order_system(ctx: &mut SimContext<'_>, indices: &SystemIndices) -> Result<()> {
    for id in ctx.store.index(indices.auto_orders).ids() {
        let entity = ctx.store.get_or_err(id)?;
        if !entity.component::<Orders>()?.is_empty() {
            continue;
        }
        let behavior = entity.component::<AutoOrder>()?.behavior;

        let order = match behavior {
            AutoOrderBehavior::Hold => None,
            AutoOrderBehavior::Escort => escort(ctx, id),
            AutoOrderBehavior::Mine => mine(ctx.store, indices, id),
        };
        if let Some(order) = order {
            enqueue(ctx.store, id, order)?;
        }
    }
    Ok(())
}

/// Close up on the commander when drifting too far from it
fn escort(ctx: &SimContext<'_>, id: EntityId) -> Option<Order> {
    let commander = ctx.store.cloned::<Commander>(id)?;
    let target = ctx.store.cloned::<Position>(commander.id)?.coord;
    let current = ctx.store.cloned::<Position>(id)?.coord;

    (current.distance(&target) > ctx.config.escort_distance).then_some(Order::Move { position: target })
}

/// Mine the nearest asteroid; haul to the nearest own facility once the
/// hold is full or nothing is left to mine
fn mine(store: &EntityStore, indices: &SystemIndices, id: EntityId) -> Option<Order> {
    let entity = store.get(id)?;
    entity.get::<Mining>()?;
    let storage = entity.get::<Storage>()?;
    let from = entity.get::<Position>()?.coord;
    let owner = entity.get::<Owner>()?.id;

    let rock = if storage.is_full() {
        None
    } else {
        nearest(store, indices.asteroids, from, |candidate| {
            candidate
                .get::<Mineable>()
                .map(|deposit| !deposit.is_exhausted())
                .unwrap_or(false)
        })
    };
    if let Some(target) = rock {
        return Some(Order::Mine { target });
    }
    if storage.is_empty() {
        return None;
    }

    nearest(store, indices.facilities, from, |candidate| {
        candidate.get::<Owner>().map(|o| o.id == owner).unwrap_or(false)
            && candidate.get::<Storage>().map(|s| !s.is_full()).unwrap_or(false)
    })
    .map(|target| Order::Deliver { target })
}

/// Closest index member passing `filter`; ties go to the lowest id
fn nearest(
    store: &EntityStore,
    index: IndexId,
    from: Vec2,
    filter: impl Fn(&crate::store::EntityHandle<'_>) -> bool,
) -> Option<EntityId> {
    let mut best: Option<(f64, EntityId)> = None;
    for id in store.index(index).iter() {
        let Some(candidate) = store.get(id) else {
            continue;
        };
        if !filter(&candidate) {
            continue;
        }
        let Some(position) = candidate.get::<Position>() else {
            continue;
        };
        let distance = position.coord.distance_squared(&from);
        if best.map_or(true, |(closest, _)| distance < closest) {
            best = Some((distance, id));
        }
    }
    best.map(|(_, id)| id)
}
