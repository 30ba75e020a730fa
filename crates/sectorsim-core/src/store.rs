//! Entity store - the arena owning every entity and component.
//!
//! Components live in a `hecs::World`; entities are addressed by stable
//! [`EntityId`]s that the store allocates monotonically and never reuses.
//! Relationships between entities are plain ids resolved through here.
//!
//! Structural changes (create, insert, remove, unregister) must go through
//! the store so that registered indices stay consistent. Component *values*
//! can be mutated freely through [`EntityStore::component_mut`] or
//! [`EntityStore::require_mut`].

use std::collections::BTreeMap;

use hecs::{ComponentError, QueryOneError, World};

use crate::components::{
    entity_has_kind, remove_id, Children, Commander, Component, ComponentKind, ComponentSet,
    DockPads, Docked, EntityId, Mining, Orders, Owner, Parent, Relations, Subordinates,
};
use crate::error::{Result, SimError};
use crate::index::{Index, IndexId, IndexRegistry};

/// Borrowed view of a live entity.
#[derive(Clone, Copy)]
pub struct EntityHandle<'a> {
    id: EntityId,
    entity: hecs::EntityRef<'a>,
}

impl<'a> EntityHandle<'a> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn get<C: Component>(&self) -> Option<hecs::Ref<'a, C>> {
        self.entity.get::<&'a C>()
    }

    /// Like [`EntityHandle::get`], failing with `MissingComponent`
    pub fn component<C: Component>(&self) -> Result<hecs::Ref<'a, C>> {
        self.get::<C>()
            .ok_or_else(|| SimError::missing_component(self.id, C::KIND.to_string()))
    }

    pub fn has<C: Component>(&self) -> bool {
        self.entity.has::<C>()
    }

    pub fn has_kind(&self, kind: ComponentKind) -> bool {
        entity_has_kind(&self.entity, kind)
    }

    pub fn has_components(&self, kinds: &[ComponentKind]) -> bool {
        kinds.iter().all(|kind| self.has_kind(*kind))
    }

    /// Narrow the handle: succeeds only if every kind is present
    pub fn require(self, kinds: &[ComponentKind]) -> Result<Self> {
        match kinds.iter().find(|kind| !self.has_kind(**kind)) {
            Some(missing) => Err(SimError::missing_component(self.id, missing.to_string())),
            None => Ok(self),
        }
    }

    pub fn kinds(&self) -> Vec<ComponentKind> {
        ComponentKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.has_kind(*kind))
            .collect()
    }

    /// Owned copy of every component
    pub fn components(&self) -> ComponentSet {
        ComponentSet::from_entity(&self.entity)
    }
}

impl std::fmt::Debug for EntityHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityHandle")
            .field("id", &self.id)
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Owner of all entity and component state
pub struct EntityStore {
    world: World,
    entities: BTreeMap<EntityId, hecs::Entity>,
    next_id: u32,
    indices: IndexRegistry,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            entities: BTreeMap::new(),
            next_id: 1,
            indices: IndexRegistry::default(),
        }
    }

    /// Create an entity from a component bundle, e.g. a tuple
    pub fn create(&mut self, components: impl hecs::DynamicBundle) -> EntityId {
        let mut builder = hecs::EntityBuilder::new();
        builder.add_bundle(components);
        self.create_from_builder(builder)
    }

    pub fn create_from_set(&mut self, components: ComponentSet) -> EntityId {
        self.create_from_builder(components.into_builder())
    }

    fn create_from_builder(&mut self, builder: hecs::EntityBuilder) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.spawn_with_id(id, builder);
        id
    }

    /// Recreate an entity under a known id (snapshot load)
    pub(crate) fn restore(&mut self, id: EntityId, components: ComponentSet) {
        self.spawn_with_id(id, components.into_builder());
        self.next_id = self.next_id.max(id.0 + 1);
    }

    fn spawn_with_id(&mut self, id: EntityId, mut builder: hecs::EntityBuilder) {
        // id travels with the entity so queries can report it
        builder.add(id);
        let entity = self.world.spawn(builder.build());
        self.entities.insert(id, entity);
        self.notify(id);
    }

    /// Next id to be allocated
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub(crate) fn set_next_id(&mut self, next_id: u32) {
        self.next_id = self.next_id.max(next_id);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// All live ids in ascending order
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// All live entities in ascending id order
    pub fn handles(&self) -> impl Iterator<Item = EntityHandle<'_>> + '_ {
        self.entities.iter().filter_map(|(id, entity)| {
            self.world.entity(*entity).ok().map(|entity| EntityHandle { id: *id, entity })
        })
    }

    pub fn get(&self, id: EntityId) -> Option<EntityHandle<'_>> {
        let entity = *self.entities.get(&id)?;
        let entity = self.world.entity(entity).ok()?;
        Some(EntityHandle { id, entity })
    }

    /// Resolve an id that the caller believes to be live
    pub fn get_or_err(&self, id: EntityId) -> Result<EntityHandle<'_>> {
        self.get(id).ok_or(SimError::MissingEntity { id })
    }

    pub fn has_components(&self, id: EntityId, kinds: &[ComponentKind]) -> bool {
        self.get(id)
            .map(|entity| entity.has_components(kinds))
            .unwrap_or(false)
    }

    pub fn require_components(&self, id: EntityId, kinds: &[ComponentKind]) -> Result<EntityHandle<'_>> {
        self.get_or_err(id)?.require(kinds)
    }

    fn raw(&self, id: EntityId) -> Result<hecs::Entity> {
        self.entities
            .get(&id)
            .copied()
            .ok_or(SimError::MissingEntity { id })
    }

    pub fn component<C: Component>(&self, id: EntityId) -> Result<hecs::Ref<'_, C>> {
        let entity = self.raw(id)?;
        self.world.get::<&C>(entity).map_err(|err| match err {
            ComponentError::NoSuchEntity => SimError::MissingEntity { id },
            ComponentError::MissingComponent(_) => {
                SimError::missing_component(id, C::KIND.to_string())
            }
        })
    }

    pub fn component_mut<C: Component>(&mut self, id: EntityId) -> Result<&mut C> {
        let entity = self.raw(id)?;
        self.world
            .query_one_mut::<&mut C>(entity)
            .map_err(|err| match err {
                QueryOneError::NoSuchEntity => SimError::MissingEntity { id },
                QueryOneError::Unsatisfied => SimError::missing_component(id, C::KIND.to_string()),
            })
    }

    /// Cloned component value, `None` when the entity or component is absent
    pub fn cloned<C: Component>(&self, id: EntityId) -> Option<C> {
        self.component::<C>(id).ok().map(|c| (*c).clone())
    }

    /// Typed capability narrowing: borrow several components at once, e.g.
    /// `store.require_mut::<(&mut Storage, &Position)>(id)?`. The entity is
    /// checked once and the caller gets plain references.
    pub fn require_mut<Q: hecs::Query>(&mut self, id: EntityId) -> Result<Q::Item<'_>> {
        let entity = self.raw(id)?;
        self.world
            .query_one_mut::<Q>(entity)
            .map_err(|err| match err {
                QueryOneError::NoSuchEntity => SimError::MissingEntity { id },
                QueryOneError::Unsatisfied => {
                    SimError::missing_component(id, std::any::type_name::<Q>())
                }
            })
    }

    /// Attach (or replace) a component
    pub fn insert<C: Component>(&mut self, id: EntityId, component: C) -> Result<()> {
        let entity = self.raw(id)?;
        self.world
            .insert_one(entity, component)
            .map_err(|_| SimError::MissingEntity { id })?;
        self.notify(id);
        Ok(())
    }

    /// Detach a component, returning it if it was present
    pub fn remove<C: Component>(&mut self, id: EntityId) -> Result<Option<C>> {
        let entity = self.raw(id)?;
        match self.world.remove_one::<C>(entity) {
            Ok(component) => {
                self.notify(id);
                Ok(Some(component))
            }
            Err(ComponentError::MissingComponent(_)) => Ok(None),
            Err(ComponentError::NoSuchEntity) => Err(SimError::MissingEntity { id }),
        }
    }

    pub fn register_index(&mut self, mut index: Index) -> IndexId {
        index.apply(self);
        self.indices.push(index)
    }

    /// # Panics
    /// If `id` was issued by a different store.
    pub fn index(&self, id: IndexId) -> &Index {
        match self.indices.get(id) {
            Some(index) => index,
            None => panic!("index {id:?} is not registered with this store"),
        }
    }

    /// # Panics
    /// If `id` was issued by a different store.
    pub fn index_mut(&mut self, id: IndexId) -> &mut Index {
        match self.indices.get_mut(id) {
            Some(index) => index,
            None => panic!("index {id:?} is not registered with this store"),
        }
    }

    pub fn indices(&self) -> &IndexRegistry {
        &self.indices
    }

    /// Re-bind and rebuild a single index
    pub fn apply_index(&mut self, id: IndexId) {
        let mut indices = self.indices.take();
        if let Some(index) = indices.get_mut(id.0) {
            index.apply(self);
        }
        self.indices.restore(indices);
    }

    /// Rebuild every bound index from scratch (after bulk loads)
    pub fn collect_indices(&mut self) {
        let mut indices = self.indices.take();
        for index in indices.iter_mut().filter(|index| index.is_bound()) {
            index.collect(self);
        }
        self.indices.restore(indices);
    }

    fn notify(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(&id).copied() else {
            return;
        };
        if let Ok(entity) = self.world.entity(entity) {
            self.indices.refresh(&EntityHandle { id, entity });
        }
    }

    /// Remove an entity after severing every relationship pointing at it.
    ///
    /// Commander/subordinate and parent/child links are detached, children
    /// are unregistered with their parent, dock pads are vacated, orders and
    /// mining targets aimed at the entity are dropped. A faction that still
    /// owns entities cannot be removed.
    pub fn unregister(&mut self, id: EntityId) -> Result<()> {
        let entity = self.get_or_err(id)?;
        let links = ComponentSet {
            commander: entity.get::<Commander>().map(|c| *c),
            subordinates: entity.get::<Subordinates>().map(|c| (*c).clone()),
            children: entity.get::<Children>().map(|c| (*c).clone()),
            parent: entity.get::<Parent>().map(|c| *c),
            docked: entity.get::<Docked>().map(|c| *c),
            dock_pads: entity.get::<DockPads>().map(|c| (*c).clone()),
            ..Default::default()
        };

        if let Some(by) = self
            .world
            .query::<(&EntityId, &Owner)>()
            .iter()
            .find(|(_, (other, owner))| owner.id == id && **other != id)
            .map(|(_, (other, _))| *other)
        {
            return Err(SimError::StillReferenced { id, by });
        }

        if let Some(commander) = links.commander {
            if let Ok(subordinates) = self.component_mut::<Subordinates>(commander.id) {
                remove_id(&mut subordinates.ids, id);
            }
        }
        for subordinate in links.subordinates.map(|s| s.ids).unwrap_or_default() {
            if self.cloned::<Commander>(subordinate).map(|c| c.id) == Some(id) {
                self.remove::<Commander>(subordinate)?;
            }
        }

        if let Some(parent) = links.parent {
            if let Ok(children) = self.component_mut::<Children>(parent.id) {
                remove_id(&mut children.ids, id);
            }
        }
        for child in links.children.map(|c| c.ids).unwrap_or_default() {
            if !self.contains(child) {
                log::warn!("entity {id} lists missing child {child}");
                continue;
            }
            self.remove::<Parent>(child)?;
            if let Err(err) = self.unregister(child) {
                log::warn!("failed to unregister child {child} of {id}: {err}");
            }
        }

        if let Some(docked) = links.docked {
            if let Ok(pads) = self.component_mut::<DockPads>(docked.at) {
                remove_id(&mut pads.docked, id);
            }
        }
        for ship in links.dock_pads.map(|p| p.docked).unwrap_or_default() {
            if self.contains(ship) {
                self.remove::<Docked>(ship)?;
            }
        }

        for (_, orders) in self.world.query_mut::<&mut Orders>() {
            orders.queue.retain(|order| order.target() != Some(id));
        }
        for (_, mining) in self.world.query_mut::<&mut Mining>() {
            if mining.target == Some(id) {
                mining.target = None;
                mining.buffer = 0.0;
            }
        }
        for (_, relations) in self.world.query_mut::<&mut Relations>() {
            relations.values.remove(&id);
        }

        self.destroy(id)
    }

    fn destroy(&mut self, id: EntityId) -> Result<()> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(SimError::MissingEntity { id })?;
        let _ = self.world.despawn(entity);
        self.indices.forget(id);
        Ok(())
    }

    /// Drop every entity and index membership; ids keep counting
    pub fn clear(&mut self) {
        self.world.clear();
        self.entities.clear();
        self.collect_indices();
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
