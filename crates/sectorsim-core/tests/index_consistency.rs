//! Index membership tracks component presence under arbitrary edits.

use proptest::prelude::*;
use sectorsim_core::components::*;
use sectorsim_core::index::{Index, IndexId};
use sectorsim_core::store::EntityStore;

#[derive(Debug, Clone)]
enum Op {
    Create,
    AddPosition(usize),
    RemovePosition(usize),
    AddStorage(usize),
    RemoveStorage(usize),
    AddMovable(usize),
    RemoveMovable(usize),
    Unregister(usize),
    Collect,
    ResetAndApply,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Create),
        3 => any::<usize>().prop_map(Op::AddPosition),
        2 => any::<usize>().prop_map(Op::RemovePosition),
        3 => any::<usize>().prop_map(Op::AddStorage),
        2 => any::<usize>().prop_map(Op::RemoveStorage),
        2 => any::<usize>().prop_map(Op::AddMovable),
        2 => any::<usize>().prop_map(Op::RemoveMovable),
        1 => any::<usize>().prop_map(Op::Unregister),
        1 => Just(Op::Collect),
        1 => Just(Op::ResetAndApply),
    ]
}

fn pick(store: &EntityStore, n: usize) -> Option<EntityId> {
    let ids = store.ids();
    (!ids.is_empty()).then(|| ids[n % ids.len()])
}

fn apply(store: &mut EntityStore, indices: &[IndexId], op: &Op) {
    match *op {
        Op::Create => {
            store.create((Position::new(0.0, 0.0),));
        }
        Op::AddPosition(n) => {
            if let Some(id) = pick(store, n) {
                store.insert(id, Position::new(1.0, 1.0)).unwrap();
            }
        }
        Op::RemovePosition(n) => {
            if let Some(id) = pick(store, n) {
                store.remove::<Position>(id).unwrap();
            }
        }
        Op::AddStorage(n) => {
            if let Some(id) = pick(store, n) {
                store.insert(id, Storage::new(10)).unwrap();
            }
        }
        Op::RemoveStorage(n) => {
            if let Some(id) = pick(store, n) {
                store.remove::<Storage>(id).unwrap();
            }
        }
        Op::AddMovable(n) => {
            if let Some(id) = pick(store, n) {
                store.insert(id, Movable::new(1.0)).unwrap();
            }
        }
        Op::RemoveMovable(n) => {
            if let Some(id) = pick(store, n) {
                store.remove::<Movable>(id).unwrap();
            }
        }
        Op::Unregister(n) => {
            if let Some(id) = pick(store, n) {
                store.unregister(id).unwrap();
            }
        }
        Op::Collect => store.collect_indices(),
        Op::ResetAndApply => {
            for index in indices {
                store.index_mut(*index).reset();
                store.apply_index(*index);
            }
        }
    }
}

proptest! {
    #[test]
    fn index_membership_matches_components(ops in prop::collection::vec(op(), 1..80)) {
        let mut store = EntityStore::new();
        let cargo = store.register_index(Index::new("cargo", &[ComponentKind::Position, ComponentKind::Storage]));
        let movers = store.register_index(Index::new("movers", &[ComponentKind::Movable]));
        let indices = [cargo, movers];

        for op in &ops {
            apply(&mut store, &indices, op);

            for handle in store.handles() {
                for index in indices {
                    let index = store.index(index);
                    prop_assert_eq!(
                        index.contains(handle.id()),
                        handle.has_components(index.requires()),
                        "{} disagrees about {} after {:?}", index.name(), handle.id(), op
                    );
                }
            }
            for index in indices {
                let index = store.index(index);
                prop_assert!(index.iter().all(|id| store.contains(id)));
                let members = index.ids();
                let mut sorted = members.clone();
                sorted.sort();
                prop_assert_eq!(members, sorted);
            }
        }
    }
}

#[test]
fn test_unbound_index_ignores_updates_until_applied() {
    let mut store = EntityStore::new();
    let movers = store.register_index(Index::new("movers", &[ComponentKind::Movable]));
    store.index_mut(movers).reset();

    let id = store.create((Movable::new(2.0),));
    assert!(!store.index(movers).contains(id));

    store.apply_index(movers);
    assert!(store.index(movers).contains(id));
}
