//! Ship components: propulsion, hull, weapons and docking state.

use serde::{Deserialize, Serialize};

use super::common::EntityId;

/// Propulsion
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Movable {
    /// Units per second
    pub speed: f64,
}

impl Movable {
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }
}

/// Hull integrity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Hitpoints {
    pub hp: f64,
    pub max: f64,
}

impl Hitpoints {
    pub fn new(max: f64) -> Self {
        Self { hp: max, max }
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Weapon output
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Damage {
    /// Hitpoints per second
    pub value: f64,
    pub range: f64,
}

impl Damage {
    pub fn new(value: f64, range: f64) -> Self {
        Self { value, range }
    }
}

/// Present while the entity occupies a dock pad
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Docked {
    pub at: EntityId,
}
