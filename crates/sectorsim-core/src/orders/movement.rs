//! Straight-line movement shared by every order that has to reach something.

use crate::components::{remove_id, ComponentKind, DockPads, Docked, EntityId, Movable, Position, Vec2};
use crate::error::Result;
use crate::store::EntityStore;

/// Step toward `destination` until within `range` of it.
///
/// Returns whether the entity is within range after this tick. An entity
/// already in range does not move; one that has to move leaves its dock
/// first and needs a `movable` component.
pub fn approach(store: &mut EntityStore, id: EntityId, destination: Vec2, range: f64, delta: f64) -> Result<bool> {
    let current = store.component::<Position>(id)?.coord;
    let distance = current.distance(&destination);
    if distance <= range {
        return Ok(true);
    }

    store.require_components(id, &[ComponentKind::Movable])?;
    undock(store, id)?;

    let (position, movable) = store.require_mut::<(&mut Position, &Movable)>(id)?;
    let direction = (destination - current).normalize();
    let step = movable.speed * delta;
    position.angle = direction.y.atan2(direction.x);

    // Arrived (or will arrive this frame)
    if step >= distance - range {
        position.coord = destination - direction * range;
        Ok(true)
    } else {
        position.coord = current + direction * step;
        Ok(false)
    }
}

/// Leave the dock pad the entity occupies, if any
pub fn undock(store: &mut EntityStore, id: EntityId) -> Result<()> {
    if let Some(docked) = store.remove::<Docked>(id)? {
        if let Ok(pads) = store.component_mut::<DockPads>(docked.at) {
            remove_id(&mut pads.docked, id);
        }
        log::debug!("{id}: undocked from {}", docked.at);
    }
    Ok(())
}
