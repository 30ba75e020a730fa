//! Mission system - resolves objectives and pays out rewards

use crate::components::{Mission, Objective, Storage};
use crate::error::Result;
use crate::events::SimEvent;
use crate::index::IndexId;
use crate::sim::SimContext;
use crate::store::EntityStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Open,
    Completed,
    Failed,
}

pub fn mission_system(ctx: &mut SimContext<'_>, index: IndexId) -> Result<()> {
    for id in ctx.store.index(index).ids() {
        let mission = (*ctx.store.component::<Mission>(id)?).clone();
        let outcome = evaluate(ctx.store, &mission, ctx.time);
        match outcome {
            Outcome::Open => continue,
            Outcome::Completed => {
                for reward in &mission.rewards {
                    if let Err(err) = reward.apply(ctx.store, ctx.config, mission.faction) {
                        log::warn!("mission {id}: {} reward not granted: {err}", reward.kind());
                    }
                }
                log::info!("mission {id} completed for {}", mission.faction);
                ctx.events.publish(&SimEvent::MissionCompleted {
                    id,
                    faction: mission.faction,
                });
            }
            Outcome::Failed => {
                log::info!("mission {id} failed for {}", mission.faction);
                ctx.events.publish(&SimEvent::MissionFailed {
                    id,
                    faction: mission.faction,
                });
            }
        }
        ctx.debug(format!("mission {id}: {outcome:?}"));
        ctx.store.unregister(id)?;
    }
    Ok(())
}

fn evaluate(store: &EntityStore, mission: &Mission, time: f64) -> Outcome {
    let done = match &mission.objective {
        // the target id is weak: once it is gone the objective is met
        Objective::Destroy { target } => !store.contains(*target),
        Objective::Deliver { commodity, amount, to } => match store.component::<Storage>(*to) {
            Ok(storage) => storage.amount(*commodity) >= *amount,
            Err(_) => return Outcome::Failed,
        },
    };
    if done {
        Outcome::Completed
    } else if mission.deadline.is_some_and(|deadline| time >= deadline) {
        Outcome::Failed
    } else {
        Outcome::Open
    }
}

#[cfg(test)]
mod tests {
    use crate::archetypes;
    use crate::components::*;
    use crate::events::{SimEvent, SimEventKind};
    use crate::sim::Sim;
    use std::sync::{Arc, Mutex};

    fn record(sim: &mut Sim) -> Arc<Mutex<Vec<SimEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        for kind in [SimEventKind::MissionCompleted, SimEventKind::MissionFailed] {
            let sink = Arc::clone(&seen);
            sim.events_mut()
                .subscribe(kind, move |event| sink.lock().unwrap().push(event.clone()));
        }
        seen
    }

    #[test]
    fn test_destroy_mission_pays_out() {
        let mut sim = Sim::default();
        let faction = sim.spawn(archetypes::faction("Union", "UNI", Color::default(), 0, false));
        let rival = sim.spawn(archetypes::faction("Rival", "RIV", Color::default(), 0, false));
        let pirate = sim.spawn(archetypes::asteroid(Vec2::ZERO, Commodity::Ore, 1));
        let mission = sim.spawn(archetypes::mission(
            "Clear the lane",
            Mission {
                faction,
                objective: Objective::Destroy { target: pirate },
                rewards: vec![
                    Reward::Money { amount: 500 },
                    Reward::Relation {
                        faction: rival,
                        amount: 0.2,
                    },
                ],
                deadline: None,
            },
        ));
        let seen = record(&mut sim);

        sim.next(1.0).unwrap();
        assert!(sim.store().contains(mission));

        sim.unregister(pirate).unwrap();
        sim.next(1.0).unwrap();

        assert!(!sim.store().contains(mission));
        assert_eq!(sim.store().component::<Budget>(faction).unwrap().money, 500);
        assert_eq!(sim.store().component::<Relations>(faction).unwrap().get(rival), 0.2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![SimEvent::MissionCompleted { id: mission, faction }]
        );
    }

    #[test]
    fn test_deadline_fails_mission() {
        let mut sim = Sim::default();
        let faction = sim.spawn(archetypes::faction("Union", "UNI", Color::default(), 0, false));
        let depot = sim.spawn(archetypes::facility("Depot", faction, Color::default(), Vec2::ZERO, 100, None));
        let mission = sim.spawn(archetypes::mission(
            "Supply run",
            Mission {
                faction,
                objective: Objective::Deliver {
                    commodity: Commodity::Food,
                    amount: 10,
                    to: depot,
                },
                rewards: vec![Reward::Money { amount: 100 }],
                deadline: Some(2.0),
            },
        ));
        let seen = record(&mut sim);

        sim.next(1.0).unwrap();
        sim.next(1.0).unwrap();
        assert!(sim.store().contains(mission));
        sim.next(1.0).unwrap();

        assert!(!sim.store().contains(mission));
        assert_eq!(sim.store().component::<Budget>(faction).unwrap().money, 0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![SimEvent::MissionFailed { id: mission, faction }]
        );
    }
}
