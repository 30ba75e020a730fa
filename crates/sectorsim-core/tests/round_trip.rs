//! Saving and reloading a running world is lossless and does not perturb
//! what happens next.

use proptest::prelude::*;
use sectorsim_core::generation::generate_world;
use sectorsim_core::prelude::*;

fn world_config() -> impl Strategy<Value = WorldGenConfig> {
    (1u32..4, 0u32..3, 0u32..3, 0u32..10, 0u32..4, 50.0f64..2000.0).prop_map(
        |(factions, miners, escorts, asteroids, collectibles, sector_size)| WorldGenConfig {
            factions,
            miners_per_faction: miners,
            escorts_per_flagship: escorts,
            asteroids,
            collectibles,
            sector_size,
            ..WorldGenConfig::default()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn reloaded_world_matches_and_continues(
        seed in any::<u64>(),
        config in world_config(),
        ticks in 0usize..60,
        delta in prop::sample::select(vec![0.25, 0.5, 1.0]),
    ) {
        let mut original = generate_world(&config, seed).unwrap();
        for _ in 0..ticks {
            original.next(delta).unwrap();
        }
        let saved = original.serialize();

        let json = saved.to_json().unwrap();
        let mut reloaded = Sim::load(Snapshot::from_json(&json).unwrap(), None).unwrap();
        prop_assert_eq!(&reloaded.serialize(), &saved);

        for _ in 0..20 {
            original.next(delta).unwrap();
            reloaded.next(delta).unwrap();
        }
        prop_assert_eq!(original.serialize(), reloaded.serialize());
    }
}
