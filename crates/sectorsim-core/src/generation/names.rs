//! Name generation utilities

use rand::seq::SliceRandom;
use rand::Rng;

/// Faction name, slug and color, in generation order
pub(crate) static FACTIONS: &[(&str, &str, &str)] = &[
    ("Terran Union", "TER", "#3f7fff"),
    ("Ceres Mining Combine", "CMC", "#e0a030"),
    ("Free Traders of Vesta", "FTV", "#40c070"),
    ("Io Syndicate", "IOS", "#c04040"),
    ("Pallas Concord", "PAL", "#a060d0"),
    ("Outer Belt Cooperative", "OBC", "#50b0c0"),
];

static SHIP_PREFIXES: &[&str] = &[
    "Bold", "Distant", "Iron", "Silent", "Red", "Restless", "Patient", "Bright", "Quiet", "Wandering",
    "Stubborn", "Far",
];

static SHIP_NOUNS: &[&str] = &[
    "Horizon", "Comet", "Harvest", "Lantern", "Anvil", "Heron", "Meridian", "Drift", "Ember", "Promise",
    "Tide", "Vigil",
];

static STATION_NAMES: &[&str] = &[
    "Haven", "Foundry", "Anchorage", "Crossing", "Outpost", "Depot", "Spire", "Refuge", "Yard",
];

/// Generate a random ship name
pub fn ship_name(rng: &mut impl Rng) -> String {
    let prefix = SHIP_PREFIXES.choose(rng).copied().unwrap_or("Nameless");
    let noun = SHIP_NOUNS.choose(rng).copied().unwrap_or("Hull");
    format!("{prefix} {noun}")
}

/// Station name prefixed with the owning faction's slug
pub fn station_name(rng: &mut impl Rng, slug: &str) -> String {
    let name = STATION_NAMES.choose(rng).copied().unwrap_or("Station");
    format!("{slug} {name} {}", rng.gen_range(1..100))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_names_are_seeded() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(ship_name(&mut a), ship_name(&mut b));
        assert!(station_name(&mut a, "TER").starts_with("TER "));
    }
}
