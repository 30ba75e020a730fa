//! Generation - procedural creation of new-game worlds
//!
//! Everything is drawn from one seeded `ChaCha8Rng`, so a seed and a
//! [`WorldGenConfig`] always give the same snapshot.

mod names;

pub use names::*;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::archetypes::{self, ShipTemplate};
use crate::components::*;
use crate::config::WorldGenConfig;
use crate::error::Result;
use crate::ownership::{assign_commander, attach_child};
use crate::sim::Sim;

struct FactionSeed {
    id: EntityId,
    slug: String,
    color: Color,
    home: Vec2,
}

/// Generate a complete sector: factions with stations, fleets and miners,
/// plus asteroid fields, loose cargo and starting missions.
pub fn generate_world(config: &WorldGenConfig, seed: u64) -> Result<Sim> {
    config.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut sim = Sim::new(config.sim.clone());

    let factions = generate_factions(&mut sim, config, &mut rng)?;
    for faction in &factions {
        let stations = generate_stations(&mut sim, config, faction, &mut rng);
        generate_fleet(&mut sim, config, faction, &mut rng)?;
        for _ in 0..config.miners_per_faction {
            let position = scatter(&mut rng, faction.home, 15.0);
            sim.spawn(archetypes::ship(
                &ShipTemplate::miner(ship_name(&mut rng)),
                faction.id,
                faction.color.clone(),
                position,
            ));
        }
        if let Some(depot) = stations.first() {
            sim.spawn(supply_mission(faction, *depot, &factions));
        }
    }

    for _ in 0..config.asteroids {
        let commodity = if rng.gen_bool(0.7) { Commodity::Ore } else { Commodity::Ice };
        let amount = rng.gen_range(200..=1000);
        let position = random_point(&mut rng, config.sector_size);
        sim.spawn(archetypes::asteroid(position, commodity, amount));
    }

    for _ in 0..config.collectibles {
        let commodity = Commodity::ALL[rng.gen_range(0..Commodity::ALL.len())];
        let amount = rng.gen_range(5..=30);
        let position = random_point(&mut rng, config.sector_size);
        sim.spawn(archetypes::collectible(position, Storage::new(amount).with(commodity, amount)));
    }

    log::info!(
        "generated sector with {} factions and {} entities (seed {seed})",
        factions.len(),
        sim.store().len()
    );
    Ok(sim)
}

fn generate_factions(sim: &mut Sim, config: &WorldGenConfig, rng: &mut ChaCha8Rng) -> Result<Vec<FactionSeed>> {
    let mut factions = Vec::new();
    for i in 0..config.factions as usize {
        let (name, slug, color) = FACTIONS[i % FACTIONS.len()];
        let generation = i / FACTIONS.len();
        let (name, slug) = if generation == 0 {
            (name.to_string(), slug.to_string())
        } else {
            (format!("{name} {}", generation + 1), format!("{slug}{}", generation + 1))
        };
        let color = Color::new(color);

        // first faction is the player's
        let id = sim.spawn(archetypes::faction(&name, &slug, color.clone(), config.starting_money, i > 0));
        let home = random_point(rng, config.sector_size * 0.8);
        factions.push(FactionSeed { id, slug, color, home });
    }

    for faction in &factions {
        let relations = sim.store_mut().component_mut::<Relations>(faction.id)?;
        for other in factions.iter().filter(|other| other.id != faction.id) {
            relations.values.insert(other.id, 0.0);
        }
    }
    Ok(factions)
}

fn generate_stations(sim: &mut Sim, config: &WorldGenConfig, faction: &FactionSeed, rng: &mut ChaCha8Rng) -> Vec<EntityId> {
    let mut stations = Vec::new();
    for i in 0..config.facilities_per_faction {
        let position = if i == 0 {
            faction.home
        } else {
            scatter(rng, faction.home, 40.0)
        };
        // each faction refines at its home station
        let recipe = (i == 0).then(archetypes::refinery_recipe);
        let mut set = archetypes::facility(
            &station_name(rng, &faction.slug),
            faction.id,
            faction.color.clone(),
            position,
            2000,
            recipe,
        );
        if i == 0 {
            set.storage = Some(Storage::new(2000).with(Commodity::Ore, 100));
        }
        stations.push(sim.spawn(set));
    }
    stations
}

/// Flagship with a turret, a beacon and a wing of escorts
fn generate_fleet(sim: &mut Sim, config: &WorldGenConfig, faction: &FactionSeed, rng: &mut ChaCha8Rng) -> Result<()> {
    let position = scatter(rng, faction.home, 10.0);
    let flagship = sim.spawn(archetypes::ship(
        &ShipTemplate::flagship(ship_name(rng)),
        faction.id,
        faction.color.clone(),
        position,
    ));

    let turret = sim.spawn(archetypes::attachment("turret", Some(faction.id), faction.color.clone()));
    attach_child(sim.store_mut(), flagship, turret)?;
    let beacon = sim.spawn(archetypes::attachment("beacon", None, Color::default()));
    attach_child(sim.store_mut(), flagship, beacon)?;

    for _ in 0..config.escorts_per_flagship {
        let escort = sim.spawn(archetypes::ship(
            &ShipTemplate::fighter(ship_name(rng)),
            faction.id,
            faction.color.clone(),
            scatter(rng, position, 3.0),
        ));
        assign_commander(sim.store_mut(), escort, flagship)?;
    }
    Ok(())
}

fn supply_mission(faction: &FactionSeed, depot: EntityId, factions: &[FactionSeed]) -> ComponentSet {
    let mut rewards = vec![Reward::Money { amount: 2000 }];
    if let Some(neighbor) = factions.iter().find(|other| other.id != faction.id) {
        rewards.push(Reward::Relation {
            faction: neighbor.id,
            amount: 0.1,
        });
    }
    archetypes::mission(
        &format!("{} metals drive", faction.slug),
        Mission {
            faction: faction.id,
            objective: Objective::Deliver {
                commodity: Commodity::Metals,
                amount: 20,
                to: depot,
            },
            rewards,
            deadline: Some(3600.0),
        },
    )
}

fn random_point(rng: &mut ChaCha8Rng, half_size: f64) -> Vec2 {
    Vec2::new(rng.gen_range(-half_size..half_size), rng.gen_range(-half_size..half_size))
}

fn scatter(rng: &mut ChaCha8Rng, around: Vec2, radius: f64) -> Vec2 {
    around + random_point(rng, radius)
}
