//! Replays and resumes must not change the outcome of a simulation.

use sectorsim_core::archetypes::{self, ShipTemplate};
use sectorsim_core::generation::generate_world;
use sectorsim_core::prelude::*;

fn additive_world() -> Snapshot {
    let mut sim = Sim::default();
    let owner = sim.spawn(archetypes::faction("Union", "UNI", Color::new("#3366ff"), 0, false));
    let courier = sim.spawn(archetypes::ship(
        &ShipTemplate::courier("Runner"),
        owner,
        Color::new("#3366ff"),
        Vec2::ZERO,
    ));
    sim.enqueue(courier, Order::Move { position: Vec2::new(1000.0, 0.0) }).unwrap();

    let mut refinery = archetypes::facility(
        "Refinery",
        owner,
        Color::new("#3366ff"),
        Vec2::new(0.0, 50.0),
        1000,
        Some(archetypes::refinery_recipe()),
    );
    refinery.storage = Some(Storage::new(1000).with(Commodity::Ore, 100));
    sim.spawn(refinery);
    sim.serialize()
}

#[test]
fn test_hundred_short_ticks_equal_one_long_tick() {
    let mut stepped = Sim::load(additive_world(), None).unwrap();
    for _ in 0..100 {
        stepped.next(1.0).unwrap();
    }

    let mut jumped = Sim::load(additive_world(), None).unwrap();
    jumped.next(100.0).unwrap();

    assert_eq!(
        stepped.serialize().to_json().unwrap(),
        jumped.serialize().to_json().unwrap()
    );
}

#[test]
fn test_resumed_world_continues_identically() {
    let config = WorldGenConfig {
        factions: 2,
        asteroids: 8,
        collectibles: 3,
        ..WorldGenConfig::default()
    };
    let mut original = generate_world(&config, 2024).unwrap();
    for _ in 0..40 {
        original.next(0.5).unwrap();
    }

    let json = original.serialize().to_json().unwrap();
    let mut resumed = Sim::load(Snapshot::from_json(&json).unwrap(), None).unwrap();

    for _ in 0..200 {
        original.next(0.5).unwrap();
        resumed.next(0.5).unwrap();
    }
    assert_eq!(original.serialize(), resumed.serialize());
    assert_eq!(original.time(), 120.0);
}

#[test]
fn test_zero_delta_keeps_time() {
    let mut sim = Sim::load(additive_world(), None).unwrap();
    let before = sim.serialize();
    sim.next(0.0).unwrap();
    let after = sim.serialize();

    assert_eq!(before.time, after.time);
    assert_eq!(before.entities.len(), after.entities.len());
}

#[test]
fn test_negative_delta_is_rejected() {
    let mut sim = Sim::load(additive_world(), None).unwrap();
    assert!(matches!(sim.next(-1.0), Err(SimError::Config(_))));
    assert!(sim.next(f64::NAN).is_err());
    assert_eq!(sim.time(), 0.0);
}
