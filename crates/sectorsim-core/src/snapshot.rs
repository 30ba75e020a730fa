//! Save/Load - versioned JSON snapshots of the whole simulation
//!
//! A snapshot holds every entity with all of its components, the id
//! allocator position, the simulated time and the configuration. Loading
//! validates the whole document before any entity is constructed, so a bad
//! snapshot never produces a partial world.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::sim::Sim;
use crate::store::EntityStore;

/// Format version written into new snapshots. Snapshots with the same
/// major version load; newer minor versions may carry unknown fields.
pub const SNAPSHOT_VERSION: &str = "1.0";
const SNAPSHOT_MAJOR: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    /// Simulated seconds
    pub time: f64,
    /// Id the next created entity receives
    pub next_id: u32,
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub config: SimConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub components: ComponentSet,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| SimError::InvalidSnapshot(err.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the whole document: version, id uniqueness and allocation,
    /// that every relationship id points at an entity in the snapshot, and
    /// that links kept on both ends agree.
    pub fn validate(&self) -> Result<()> {
        let major = self
            .version
            .split('.')
            .next()
            .and_then(|major| major.parse::<u32>().ok())
            .ok_or_else(|| invalid(format!("malformed version `{}`", self.version)))?;
        if major != SNAPSHOT_MAJOR {
            return Err(invalid(format!(
                "unsupported version {} (expected {SNAPSHOT_MAJOR}.x)",
                self.version
            )));
        }
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(invalid(format!("invalid time {}", self.time)));
        }
        self.config
            .validate()
            .map_err(|err| invalid(format!("config: {err}")))?;

        // the allocator must still be able to hand out a fresh id
        if self.next_id == u32::MAX {
            return Err(invalid(format!("nextId {} leaves no ids to allocate", self.next_id)));
        }

        let mut entities = BTreeMap::new();
        for record in &self.entities {
            if record.id.0 >= self.next_id {
                return Err(invalid(format!(
                    "entity {} is not below nextId {}",
                    record.id, self.next_id
                )));
            }
            if entities.insert(record.id, &record.components).is_some() {
                return Err(invalid(format!("duplicate entity {}", record.id)));
            }
        }

        for record in &self.entities {
            for (field, reference) in references(&record.components) {
                if !entities.contains_key(&reference) {
                    return Err(invalid(format!(
                        "entity {} references missing entity {reference} in `{field}`",
                        record.id
                    )));
                }
            }
        }
        for record in &self.entities {
            check_back_links(record.id, &record.components, &entities)?;
        }
        Ok(())
    }
}

fn invalid(message: String) -> SimError {
    SimError::InvalidSnapshot(message)
}

/// Commander/subordinates, parent/children and docked/dock pads are stored
/// on both ends; a link recorded on one side only is rejected.
fn check_back_links(
    id: EntityId,
    set: &ComponentSet,
    entities: &BTreeMap<EntityId, &ComponentSet>,
) -> Result<()> {
    let other = |target: EntityId| entities.get(&target).copied();
    let one_sided = |field: &str, target: EntityId| {
        invalid(format!("entity {id} links {target} in `{field}` but {target} does not link back"))
    };

    if let Some(commander) = &set.commander {
        let mirrored = other(commander.id)
            .and_then(|c| c.subordinates.as_ref())
            .is_some_and(|s| s.ids.contains(&id));
        if !mirrored {
            return Err(one_sided("commander", commander.id));
        }
    }
    for subordinate in set.subordinates.iter().flat_map(|s| s.ids.iter().copied()) {
        let mirrored = other(subordinate)
            .and_then(|s| s.commander.as_ref())
            .is_some_and(|c| c.id == id);
        if !mirrored {
            return Err(one_sided("subordinates", subordinate));
        }
    }

    if let Some(parent) = &set.parent {
        let mirrored = other(parent.id)
            .and_then(|p| p.children.as_ref())
            .is_some_and(|c| c.ids.contains(&id));
        if !mirrored {
            return Err(one_sided("parent", parent.id));
        }
    }
    for child in set.children.iter().flat_map(|c| c.ids.iter().copied()) {
        let mirrored = other(child)
            .and_then(|c| c.parent.as_ref())
            .is_some_and(|p| p.id == id);
        if !mirrored {
            return Err(one_sided("children", child));
        }
    }

    if let Some(docked) = &set.docked {
        let mirrored = other(docked.at)
            .and_then(|f| f.dock_pads.as_ref())
            .is_some_and(|pads| pads.docked.contains(&id));
        if !mirrored {
            return Err(one_sided("docked", docked.at));
        }
    }
    for ship in set.dock_pads.iter().flat_map(|p| p.docked.iter().copied()) {
        let mirrored = other(ship)
            .and_then(|s| s.docked.as_ref())
            .is_some_and(|d| d.at == id);
        if !mirrored {
            return Err(one_sided("dockPads", ship));
        }
    }
    Ok(())
}

/// Every strong entity reference held by a component set. Mission
/// objectives and rewards are weak and may dangle.
fn references(set: &ComponentSet) -> Vec<(&'static str, EntityId)> {
    let mut refs = Vec::new();
    if let Some(owner) = &set.owner {
        refs.push(("owner", owner.id));
    }
    if let Some(commander) = &set.commander {
        refs.push(("commander", commander.id));
    }
    if let Some(subordinates) = &set.subordinates {
        refs.extend(subordinates.ids.iter().map(|id| ("subordinates", *id)));
    }
    if let Some(children) = &set.children {
        refs.extend(children.ids.iter().map(|id| ("children", *id)));
    }
    if let Some(parent) = &set.parent {
        refs.push(("parent", parent.id));
    }
    if let Some(docked) = &set.docked {
        refs.push(("docked", docked.at));
    }
    if let Some(pads) = &set.dock_pads {
        refs.extend(pads.docked.iter().map(|id| ("dockPads", *id)));
    }
    if let Some(target) = set.mining.and_then(|mining| mining.target) {
        refs.push(("mining", target));
    }
    if let Some(orders) = &set.orders {
        refs.extend(orders.queue.iter().filter_map(Order::target).map(|id| ("orders", id)));
    }
    if let Some(relations) = &set.relations {
        refs.extend(relations.values.keys().map(|id| ("relations", *id)));
    }
    refs
}

impl Sim {
    /// Capture the whole simulation
    pub fn serialize(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            time: self.time(),
            next_id: self.store().next_id(),
            entities: self
                .store()
                .handles()
                .map(|entity| EntityRecord {
                    id: entity.id(),
                    components: entity.components(),
                })
                .collect(),
            config: self.config().clone(),
        }
    }

    /// Rebuild a simulation from a snapshot. `config` replaces the
    /// snapshot's own configuration when given.
    pub fn load(snapshot: Snapshot, config: Option<SimConfig>) -> Result<Sim> {
        snapshot.validate()?;
        let config = match config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => snapshot.config,
        };

        let mut store = EntityStore::new();
        for EntityRecord { id, mut components } in snapshot.entities {
            if let Some(archetype) = components.archetype {
                let added = archetype.fill_defaults(&mut components);
                if !added.is_empty() {
                    log::debug!("{id}: filled default {added:?}");
                }
            }
            store.restore(id, components);
        }
        store.set_next_id(snapshot.next_id);

        log::info!(
            "loaded snapshot: {} entities at t={}",
            store.len(),
            snapshot.time
        );
        Ok(Sim::from_store(store, config, snapshot.time))
    }
}
