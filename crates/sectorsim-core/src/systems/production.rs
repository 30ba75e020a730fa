//! Production system - facilities turn recipe inputs into outputs

use crate::components::{Production, Storage};
use crate::error::Result;
use crate::index::IndexId;
use crate::sim::SimContext;

/// Run every production line for `ctx.delta` seconds. A long tick can
/// finish several cycles; time left over after a cycle goes to the next one.
pub fn production_system(ctx: &mut SimContext<'_>, index: IndexId) -> Result<()> {
    let delta = ctx.delta;
    for id in ctx.store.index(index).ids() {
        let (production, storage) = ctx.store.require_mut::<(&mut Production, &mut Storage)>(id)?;
        if production.recipe.duration <= 0.0 {
            continue;
        }
        let cycles = advance(production, storage, delta);
        if cycles > 0 {
            log::debug!("{id}: finished {cycles} production cycles");
        }
    }
    Ok(())
}

/// Returns the number of completed cycles
fn advance(production: &mut Production, storage: &mut Storage, delta: f64) -> u32 {
    let mut remaining = delta;
    let mut cycles = 0;
    loop {
        if !production.active {
            if !can_start(production, storage) {
                return cycles;
            }
            for (commodity, quantity) in &production.recipe.input {
                storage.take(*commodity, *quantity);
            }
            production.active = true;
        }

        let needed = production.recipe.duration - production.progress;
        if remaining < needed {
            production.progress += remaining;
            return cycles;
        }
        remaining -= needed;
        production.progress = production.recipe.duration;

        // finished goods wait on the line until the whole batch fits
        let output: u64 = production.recipe.output.values().sum();
        if storage.free() < output {
            return cycles;
        }
        production.progress = 0.0;
        production.active = false;
        for (commodity, quantity) in &production.recipe.output {
            storage.add(*commodity, *quantity);
        }
        cycles += 1;
    }
}

/// Inputs are on hand and the outputs will fit once they are consumed
fn can_start(production: &Production, storage: &Storage) -> bool {
    let input: u64 = production.recipe.input.values().sum();
    let output: u64 = production.recipe.output.values().sum();
    storage.has_all(&production.recipe.input) && storage.free() + input >= output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetypes::refinery_recipe;
    use crate::components::Commodity;

    #[test]
    fn test_long_tick_runs_several_cycles() {
        let mut production = Production::new(refinery_recipe());
        let mut storage = Storage::new(1000).with(Commodity::Ore, 100);

        let cycles = advance(&mut production, &mut storage, 100.0);

        assert_eq!(cycles, 3);
        assert_eq!(storage.amount(Commodity::Metals), 6);
        // fourth cycle already started, inputs consumed
        assert_eq!(storage.amount(Commodity::Ore), 60);
        assert!(production.active);
        assert_eq!(production.progress, 10.0);
    }

    #[test]
    fn test_short_ticks_match_long_tick() {
        let mut long = (Production::new(refinery_recipe()), Storage::new(1000).with(Commodity::Ore, 100));
        let mut short = long.clone();

        advance(&mut long.0, &mut long.1, 100.0);
        for _ in 0..100 {
            advance(&mut short.0, &mut short.1, 1.0);
        }

        assert_eq!(long, short);
    }

    #[test]
    fn test_full_storage_holds_finished_batch() {
        let mut production = Production::new(refinery_recipe());
        let mut storage = Storage::new(20).with(Commodity::Ore, 10);

        advance(&mut production, &mut storage, 1.0);
        storage.add(Commodity::Ore, 20);
        assert!(storage.is_full());

        assert_eq!(advance(&mut production, &mut storage, 29.0), 0);
        assert_eq!(advance(&mut production, &mut storage, 10.0), 0);
        assert!(production.active);
        assert_eq!(production.progress, production.recipe.duration);
        assert_eq!(storage.amount(Commodity::Metals), 0);
        assert_eq!(storage.amount(Commodity::Ore), 20);

        storage.take(Commodity::Ore, 5);
        assert_eq!(advance(&mut production, &mut storage, 0.0), 1);
        assert_eq!(storage.amount(Commodity::Metals), 2);
        // next batch starts right away
        assert_eq!(storage.amount(Commodity::Ore), 5);
        assert!(production.active);
        assert_eq!(production.progress, 0.0);
    }

    #[test]
    fn test_idle_without_inputs() {
        let mut production = Production::new(refinery_recipe());
        let mut storage = Storage::new(1000).with(Commodity::Ore, 5);

        assert_eq!(advance(&mut production, &mut storage, 60.0), 0);
        assert!(!production.active);
        assert_eq!(storage.amount(Commodity::Ore), 5);
    }
}
