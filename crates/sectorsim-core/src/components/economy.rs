//! Economy components: cargo, money, mining and production.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::common::EntityId;

/// Tradeable goods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Commodity {
    Ore,
    Ice,
    Fuel,
    Food,
    Water,
    Metals,
    Electronics,
}

impl Commodity {
    pub const ALL: [Commodity; 7] = [
        Commodity::Ore,
        Commodity::Ice,
        Commodity::Fuel,
        Commodity::Food,
        Commodity::Water,
        Commodity::Metals,
        Commodity::Electronics,
    ];
}

impl std::fmt::Display for Commodity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Commodity::Ore => "ore",
            Commodity::Ice => "ice",
            Commodity::Fuel => "fuel",
            Commodity::Food => "food",
            Commodity::Water => "water",
            Commodity::Metals => "metals",
            Commodity::Electronics => "electronics",
        };
        f.write_str(name)
    }
}

/// Cargo hold. Quantities are whole units.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Storage {
    pub capacity: u64,
    #[serde(default)]
    pub stored: BTreeMap<Commodity, u64>,
}

impl Storage {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            stored: BTreeMap::new(),
        }
    }

    pub fn with(mut self, commodity: Commodity, quantity: u64) -> Self {
        *self.stored.entry(commodity).or_insert(0) += quantity;
        self
    }

    pub fn used(&self) -> u64 {
        self.stored.values().sum()
    }

    pub fn free(&self) -> u64 {
        self.capacity.saturating_sub(self.used())
    }

    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    pub fn is_empty(&self) -> bool {
        self.used() == 0
    }

    pub fn amount(&self, commodity: Commodity) -> u64 {
        self.stored.get(&commodity).copied().unwrap_or(0)
    }

    /// Add up to `quantity`, returns how much was accepted
    pub fn add(&mut self, commodity: Commodity, quantity: u64) -> u64 {
        let accepted = quantity.min(self.free());
        if accepted > 0 {
            *self.stored.entry(commodity).or_insert(0) += accepted;
        }
        accepted
    }

    /// Remove up to `quantity`, returns how much was taken
    pub fn take(&mut self, commodity: Commodity, quantity: u64) -> u64 {
        let Some(held) = self.stored.get_mut(&commodity) else {
            return 0;
        };
        let taken = quantity.min(*held);
        *held -= taken;
        if *held == 0 {
            self.stored.remove(&commodity);
        }
        taken
    }

    /// Whether every listed quantity is present
    pub fn has_all(&self, goods: &BTreeMap<Commodity, u64>) -> bool {
        goods.iter().all(|(c, q)| self.amount(*c) >= *q)
    }
}

/// Faction treasury
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Budget {
    pub money: i64,
}

impl Budget {
    pub fn new(money: i64) -> Self {
        Self { money }
    }
}

/// Marks a loose cargo container that can be picked up with a collect order.
/// The contents live in the entity's `storage`.
// braced so it serializes as `{}` rather than `null`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collectible {}

/// Asteroid resource deposit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Mineable {
    pub commodity: Commodity,
    pub remaining: u64,
}

impl Mineable {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

impl Default for Mineable {
    fn default() -> Self {
        Self {
            commodity: Commodity::Ore,
            remaining: 0,
        }
    }
}

/// Mining equipment of a ship
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Mining {
    /// Units per second
    pub rate: f64,
    /// Fractional progress toward the next whole unit
    #[serde(default)]
    pub buffer: f64,
    /// Asteroid currently being mined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EntityId>,
}

impl Mining {
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            buffer: 0.0,
            target: None,
        }
    }
}

/// Production recipe: consumes `input`, yields `output` every `duration` seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub input: BTreeMap<Commodity, u64>,
    pub output: BTreeMap<Commodity, u64>,
    pub duration: f64,
}

/// Facility production line
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Production {
    pub recipe: Recipe,
    /// Seconds accumulated in the running cycle
    #[serde(default)]
    pub progress: f64,
    /// Whether the inputs of the running cycle have been consumed
    #[serde(default)]
    pub active: bool,
}

impl Production {
    pub fn new(recipe: Recipe) -> Self {
        Self {
            recipe,
            progress: 0.0,
            active: false,
        }
    }
}

/// Docking pads of a facility
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DockPads {
    pub capacity: usize,
    #[serde(default)]
    pub docked: Vec<EntityId>,
}

impl DockPads {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            docked: Vec::new(),
        }
    }

    pub fn has_free_pad(&self) -> bool {
        self.docked.len() < self.capacity
    }
}
