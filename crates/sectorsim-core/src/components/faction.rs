//! Faction, ownership and hierarchy components.
//!
//! Relationships are stored as ids and resolved through the store.
//! `commander`/`subordinates` and `parent`/`children` are kept symmetric.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::common::EntityId;

/// Faction color as `#rrggbb`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self("#888888".to_string())
    }
}

/// Faction definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Faction {
    /// Short unique code, e.g. "TAU"
    pub slug: String,
    pub color: Color,
    /// Whether the faction is computer controlled
    #[serde(default)]
    pub ai: bool,
}

/// Controlling faction of an ownable entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    pub id: EntityId,
}

/// Standing of a faction toward other factions, in `[-1, 1]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Relations {
    #[serde(default)]
    pub values: BTreeMap<EntityId, f64>,
}

impl Relations {
    pub fn get(&self, faction: EntityId) -> f64 {
        self.values.get(&faction).copied().unwrap_or(0.0)
    }
}

/// Presentation hints consumed by the renderer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Render {
    pub color: Color,
    #[serde(default)]
    pub texture: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Default for Render {
    fn default() -> Self {
        Self::new("", Color::default())
    }
}

impl Render {
    pub fn new(texture: impl Into<String>, color: Color) -> Self {
        Self {
            color,
            texture: texture.into(),
            visible: true,
        }
    }
}

/// Link to the entity this one takes orders from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commander {
    pub id: EntityId,
}

/// Entities commanded by this one
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subordinates {
    #[serde(default)]
    pub ids: Vec<EntityId>,
}

/// Attached entities (modules, turrets, decorations)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Children {
    #[serde(default)]
    pub ids: Vec<EntityId>,
}

/// Entity this one is attached to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parent {
    pub id: EntityId,
}

/// Ordered id set helpers shared by `Subordinates` and `Children`
pub(crate) fn insert_id(ids: &mut Vec<EntityId>, id: EntityId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

pub(crate) fn remove_id(ids: &mut Vec<EntityId>, id: EntityId) -> bool {
    let before = ids.len();
    ids.retain(|other| *other != id);
    ids.len() != before
}
