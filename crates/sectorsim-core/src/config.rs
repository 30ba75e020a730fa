//! Simulation and world generation settings.
//!
//! `SimConfig` travels inside every snapshot and can be overridden on load.
//! Every field has a default, so partial JSON documents are accepted.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::Commodity;
use crate::error::{Result, SimError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    /// Ticks between two progress messages of a headless run
    pub progress_cycle: u32,
    /// Distance within which a collect order picks up its target
    pub collect_range: f64,
    /// Distance within which a ship can dock, mine or deliver
    pub dock_range: f64,
    /// Escorts idle closer than this to their commander
    pub escort_distance: f64,
    /// Relation values are clamped to `[-limit, limit]`
    pub relation_limit: f64,
    /// Unit prices paid when selling to another faction
    pub prices: BTreeMap<Commodity, i64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let prices = BTreeMap::from([
            (Commodity::Ore, 12),
            (Commodity::Ice, 8),
            (Commodity::Fuel, 40),
            (Commodity::Food, 25),
            (Commodity::Water, 15),
            (Commodity::Metals, 60),
            (Commodity::Electronics, 150),
        ]);
        Self {
            progress_cycle: 1000,
            collect_range: 1.0,
            dock_range: 2.0,
            escort_distance: 5.0,
            relation_limit: 1.0,
            prices,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_cycle == 0 {
            return Err(SimError::Config("progressCycle must be positive".into()));
        }
        for (name, value) in [
            ("collectRange", self.collect_range),
            ("dockRange", self.dock_range),
            ("escortDistance", self.escort_distance),
            ("relationLimit", self.relation_limit),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::Config(format!("{name} must be a non-negative number")));
            }
        }
        Ok(())
    }

    pub fn price(&self, commodity: Commodity) -> i64 {
        self.prices.get(&commodity).copied().unwrap_or(0)
    }
}

/// Parameters of a generated new-game world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldGenConfig {
    pub factions: u32,
    pub facilities_per_faction: u32,
    pub miners_per_faction: u32,
    pub escorts_per_flagship: u32,
    pub asteroids: u32,
    pub collectibles: u32,
    /// Half-width of the square sector
    pub sector_size: f64,
    pub starting_money: i64,
    pub sim: SimConfig,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            factions: 3,
            facilities_per_faction: 2,
            miners_per_faction: 3,
            escorts_per_flagship: 2,
            asteroids: 24,
            collectibles: 6,
            sector_size: 200.0,
            starting_money: 10_000,
            sim: SimConfig::default(),
        }
    }
}

impl WorldGenConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: WorldGenConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.factions == 0 {
            return Err(SimError::Config("at least one faction is required".into()));
        }
        if !self.sector_size.is_finite() || self.sector_size <= 0.0 {
            return Err(SimError::Config(format!(
                "sectorSize must be a positive number, got {}",
                self.sector_size
            )));
        }
        self.sim.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{"progressCycle": 50}"#).unwrap();
        assert_eq!(config.progress_cycle, 50);
        assert_eq!(config.dock_range, SimConfig::default().dock_range);
        assert_eq!(config.price(Commodity::Ore), 12);
    }

    #[test]
    fn test_rejects_zero_progress_cycle() {
        let err = SimConfig::from_json(r#"{"progressCycle": 0}"#).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn test_world_gen_requires_factions() {
        assert!(WorldGenConfig::from_json(r#"{"factions": 0}"#).is_err());
        assert_eq!(WorldGenConfig::from_json("{}").unwrap(), WorldGenConfig::default());
    }

    #[test]
    fn test_world_gen_requires_positive_sector() {
        for json in [r#"{"sectorSize": 0}"#, r#"{"sectorSize": -50.0}"#] {
            let err = WorldGenConfig::from_json(json).unwrap_err();
            assert!(matches!(err, SimError::Config(msg) if msg.contains("sectorSize")));
        }
        let config = WorldGenConfig {
            sector_size: f64::NAN,
            ..WorldGenConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
