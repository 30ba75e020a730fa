//! Incrementally maintained entity subsets.
//!
//! An [`Index`] holds the ids of every entity carrying a given set of
//! component kinds. Indices registered with the store receive a
//! notification on every structural change (entity created or removed,
//! component inserted or removed) so systems never rescan the world.
//!
//! Members are kept in ascending id order, which is creation order. Loading
//! a snapshot therefore reproduces the exact iteration order of the saved
//! simulation.

use std::collections::BTreeSet;

use crate::components::{ComponentKind, EntityId};
use crate::store::{EntityHandle, EntityStore};

/// Cached view over entities matching a component predicate.
#[derive(Debug, Clone)]
pub struct Index {
    name: String,
    requires: Vec<ComponentKind>,
    members: BTreeSet<EntityId>,
    bound: bool,
}

impl Index {
    pub fn new(name: impl Into<String>, requires: &[ComponentKind]) -> Self {
        let mut requires = requires.to_vec();
        requires.sort();
        requires.dedup();
        Self {
            name: name.into(),
            requires,
            members: BTreeSet::new(),
            bound: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requires(&self) -> &[ComponentKind] {
        &self.requires
    }

    /// Whether the index currently receives store notifications
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn matches(&self, entity: &EntityHandle<'_>) -> bool {
        entity.has_components(&self.requires)
    }

    /// Update membership of one entity. Returns whether it is a member afterwards.
    pub fn add(&mut self, entity: &EntityHandle<'_>) -> bool {
        if self.matches(entity) {
            self.members.insert(entity.id());
            true
        } else {
            self.members.remove(&entity.id());
            false
        }
    }

    /// Drop an entity. Returns whether it was a member.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.members.remove(&id)
    }

    /// Rebuild membership by scanning the store once
    pub fn collect(&mut self, store: &EntityStore) {
        self.members = store
            .handles()
            .filter(|entity| self.matches(entity))
            .map(|entity| entity.id())
            .collect();
    }

    /// Drop membership. The index stays bound and keeps receiving updates.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Drop membership and unbind until the next [`Index::apply`]
    pub fn reset(&mut self) {
        self.members.clear();
        self.bound = false;
    }

    /// Bind to a store and build membership from it
    pub fn apply(&mut self, store: &EntityStore) {
        self.bound = true;
        self.collect(store);
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    /// Owned copy of the members, for iterating while mutating the store
    pub fn ids(&self) -> Vec<EntityId> {
        self.members.iter().copied().collect()
    }
}

/// Handle to an index registered with a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexId(pub(crate) usize);

/// Indices owned by a store
#[derive(Debug, Clone, Default)]
pub struct IndexRegistry {
    indices: Vec<Index>,
}

impl IndexRegistry {
    pub(crate) fn push(&mut self, index: Index) -> IndexId {
        self.indices.push(index);
        IndexId(self.indices.len() - 1)
    }

    pub fn get(&self, id: IndexId) -> Option<&Index> {
        self.indices.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: IndexId) -> Option<&mut Index> {
        self.indices.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Index> {
        self.indices.iter()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Forward a structural change of a live entity to every bound index
    pub(crate) fn refresh(&mut self, entity: &EntityHandle<'_>) {
        for index in self.indices.iter_mut().filter(|index| index.bound) {
            index.add(entity);
        }
    }

    pub(crate) fn forget(&mut self, id: EntityId) {
        for index in self.indices.iter_mut() {
            index.remove(id);
        }
    }

    pub(crate) fn take(&mut self) -> Vec<Index> {
        std::mem::take(&mut self.indices)
    }

    pub(crate) fn restore(&mut self, indices: Vec<Index>) {
        self.indices = indices;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::*;

    #[test]
    fn test_index_tracks_component_changes() {
        let mut store = EntityStore::new();
        let cargo = store.register_index(Index::new(
            "cargo",
            &[ComponentKind::Storage, ComponentKind::Position],
        ));

        let a = store.create((Position::new(0.0, 0.0), Storage::new(10)));
        let b = store.create((Position::new(1.0, 0.0),));
        assert_eq!(store.index(cargo).ids(), vec![a]);

        store.insert(b, Storage::new(5)).unwrap();
        assert_eq!(store.index(cargo).ids(), vec![a, b]);

        store.remove::<Storage>(a).unwrap();
        assert_eq!(store.index(cargo).ids(), vec![b]);

        store.unregister(b).unwrap();
        assert!(store.index(cargo).is_empty());
    }

    #[test]
    fn test_clear_keeps_binding_reset_drops_it() {
        let mut store = EntityStore::new();
        let named = store.register_index(Index::new("named", &[ComponentKind::Name]));
        store.create((Name::new("a"),));

        store.index_mut(named).clear();
        assert!(store.index(named).is_empty());
        let b = store.create((Name::new("b"),));
        assert_eq!(store.index(named).ids(), vec![b]);

        store.index_mut(named).reset();
        store.create((Name::new("c"),));
        assert!(store.index(named).is_empty());
        assert!(!store.index(named).is_bound());

        store.apply_index(named);
        assert_eq!(store.index(named).len(), 3);
    }

    #[test]
    fn test_unbound_index_collects_in_isolation() {
        let mut store = EntityStore::new();
        let a = store.create((Name::new("a"), Storage::new(1)));
        store.create((Name::new("b"),));

        let mut index = Index::new("storage", &[ComponentKind::Storage]);
        assert!(index.is_empty());
        index.collect(&store);
        assert_eq!(index.ids(), vec![a]);
        assert!(!index.is_bound());
    }
}
