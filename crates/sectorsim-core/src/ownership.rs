//! Ownership transfer and command hierarchy maintenance.
//!
//! [`transfer_ownership`] hands an entity to another faction and cascades
//! through its children and subordinates. Every step after resolving the
//! new owner is isolated: a stale id in one child or subordinate is logged
//! and skipped, the rest of the cascade still runs.

use std::collections::BTreeSet;

use crate::components::*;
use crate::error::{Result, SimError};
use crate::events::{EventBus, SimEvent};
use crate::orders::clear_orders;
use crate::store::EntityStore;

/// Components a subordinate needs to be released from its commander
const DETACHABLE: &[ComponentKind] = &[ComponentKind::AutoOrder, ComponentKind::Commander, ComponentKind::Orders];

pub fn transfer_ownership(
    store: &mut EntityStore,
    events: &mut EventBus<SimEvent>,
    id: EntityId,
    new_owner: EntityId,
) -> Result<()> {
    let mut visited = BTreeSet::new();
    transfer(store, events, id, new_owner, &mut visited)
}

fn transfer(
    store: &mut EntityStore,
    events: &mut EventBus<SimEvent>,
    id: EntityId,
    new_owner: EntityId,
    visited: &mut BTreeSet<EntityId>,
) -> Result<()> {
    if !visited.insert(id) {
        return Ok(());
    }

    store.get_or_err(new_owner)?;
    let owner = store.component_mut::<Owner>(id)?;
    let previous = std::mem::replace(&mut owner.id, new_owner);

    if let Some(commander) = store.cloned::<Commander>(id) {
        isolated(id, "detach from commander", detach_commander(store, id, commander.id));
    }

    if store.get_or_err(id)?.has::<Orders>() {
        isolated(id, "cancel orders", clear_orders(store, events, id));
    }

    for child in store.cloned::<Children>(id).map(|c| c.ids).unwrap_or_default() {
        let result = match store.get(child).map(|handle| handle.has::<Owner>()) {
            None => Err(SimError::MissingEntity { id: child }),
            // pure visual attachments stay as they are
            Some(false) => continue,
            Some(true) => transfer(store, events, child, new_owner, visited),
        };
        isolated(id, "transfer child", result);
    }

    for subordinate in store.cloned::<Subordinates>(id).map(|s| s.ids).unwrap_or_default() {
        let result = match store.get(subordinate).map(|handle| handle.has_components(DETACHABLE)) {
            None => Err(SimError::MissingEntity { id: subordinate }),
            Some(false) => continue,
            Some(true) => release(store, events, subordinate, id),
        };
        isolated(id, "release subordinate", result);
    }

    if store.get_or_err(id)?.has::<Render>() {
        isolated(id, "recolor", recolor(store, id, new_owner));
    }

    log::debug!("{id}: ownership {previous} -> {new_owner}");
    events.publish(&SimEvent::OwnershipTransferred {
        id,
        from: previous,
        to: new_owner,
    });
    Ok(())
}

fn isolated(id: EntityId, step: &str, result: Result<()>) {
    if let Err(err) = result {
        log::warn!("ownership transfer of {id}: {step} failed: {err}");
    }
}

/// Detach a subordinate and leave it idle
fn release(
    store: &mut EntityStore,
    events: &mut EventBus<SimEvent>,
    subordinate: EntityId,
    commander: EntityId,
) -> Result<()> {
    detach_commander(store, subordinate, commander)?;
    clear_orders(store, events, subordinate)?;
    store.component_mut::<AutoOrder>(subordinate)?.behavior = AutoOrderBehavior::Hold;
    Ok(())
}

fn recolor(store: &mut EntityStore, id: EntityId, owner: EntityId) -> Result<()> {
    let color = store
        .require_components(owner, &[ComponentKind::Faction])?
        .component::<Faction>()?
        .color
        .clone();
    store.component_mut::<Render>(id)?.color = color;
    Ok(())
}

/// Place `subordinate` under `commander`, leaving any previous commander
pub fn assign_commander(store: &mut EntityStore, subordinate: EntityId, commander: EntityId) -> Result<()> {
    store.get_or_err(commander)?;
    if let Some(previous) = store.cloned::<Commander>(subordinate) {
        detach_commander(store, subordinate, previous.id)?;
    }
    store.insert(subordinate, Commander { id: commander })?;
    match store.component_mut::<Subordinates>(commander) {
        Ok(subordinates) => {
            insert_id(&mut subordinates.ids, subordinate);
        }
        Err(_) => store.insert(commander, Subordinates { ids: vec![subordinate] })?,
    }
    Ok(())
}

/// Remove the commander link on both ends. A commander that no longer
/// lists the subordinate is not an error.
pub fn detach_commander(store: &mut EntityStore, subordinate: EntityId, commander: EntityId) -> Result<()> {
    store.remove::<Commander>(subordinate)?;
    let subordinates = store.component_mut::<Subordinates>(commander)?;
    remove_id(&mut subordinates.ids, subordinate);
    Ok(())
}

/// Mount `child` on `parent`. Children are unregistered with their parent.
pub fn attach_child(store: &mut EntityStore, parent: EntityId, child: EntityId) -> Result<()> {
    store.get_or_err(parent)?;
    if let Some(previous) = store.cloned::<Parent>(child) {
        if let Ok(children) = store.component_mut::<Children>(previous.id) {
            remove_id(&mut children.ids, child);
        }
    }
    store.insert(child, Parent { id: parent })?;
    match store.component_mut::<Children>(parent) {
        Ok(children) => {
            insert_id(&mut children.ids, child);
        }
        Err(_) => store.insert(parent, Children { ids: vec![child] })?,
    }
    Ok(())
}
