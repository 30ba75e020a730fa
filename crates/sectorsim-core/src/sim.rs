//! Simulation clock - main entry point for running the simulation
//!
//! A [`Sim`] owns the entity store, the event bus and the configuration.
//! [`Sim::next`] runs the fixed system pipeline once and advances the clock;
//! nothing in the pipeline reads the wall clock, so the same sequence of
//! deltas always produces the same world.

use crate::components::*;
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::events::{Channel, DebugEvent, EventBus, SimEvent};
use crate::index::{Index, IndexId};
use crate::orders;
use crate::ownership;
use crate::store::EntityStore;
use crate::systems;

/// Indices the system pipeline iterates
#[derive(Debug, Clone, Copy)]
pub struct SystemIndices {
    pub orders: IndexId,
    pub auto_orders: IndexId,
    pub asteroids: IndexId,
    pub facilities: IndexId,
    pub production: IndexId,
    pub missions: IndexId,
}

impl SystemIndices {
    fn register(store: &mut EntityStore) -> Self {
        use ComponentKind as K;
        Self {
            orders: store.register_index(Index::new("orders", &[K::Orders])),
            auto_orders: store.register_index(Index::new("auto_orders", &[K::AutoOrder, K::Orders])),
            asteroids: store.register_index(Index::new("asteroids", &[K::Mineable, K::Position])),
            facilities: store.register_index(Index::new(
                "facilities",
                &[K::DockPads, K::Storage, K::Owner, K::Position],
            )),
            production: store.register_index(Index::new("production", &[K::Production, K::Storage])),
            missions: store.register_index(Index::new("missions", &[K::Mission])),
        }
    }
}

/// Borrowed slice of the simulation handed to systems and order handlers
/// for the duration of one tick.
pub struct SimContext<'a> {
    pub store: &'a mut EntityStore,
    pub events: &'a mut EventBus<SimEvent>,
    pub debug: &'a mut Channel<DebugEvent>,
    pub config: &'a SimConfig,
    /// Simulated time at the start of the tick
    pub time: f64,
    pub delta: f64,
}

impl SimContext<'_> {
    pub fn debug(&mut self, message: impl Into<String>) {
        self.debug.publish(&DebugEvent {
            time: self.time,
            message: message.into(),
        });
    }
}

/// Main simulation
pub struct Sim {
    store: EntityStore,
    events: EventBus<SimEvent>,
    debug: Channel<DebugEvent>,
    config: SimConfig,
    /// Simulated seconds since the world began
    time: f64,
    indices: SystemIndices,
}

impl Sim {
    /// Create an empty simulation
    pub fn new(config: SimConfig) -> Self {
        Self::from_store(EntityStore::new(), config, 0.0)
    }

    /// Wrap a populated store. Indices are built from its current content.
    pub(crate) fn from_store(mut store: EntityStore, config: SimConfig, time: f64) -> Self {
        let indices = SystemIndices::register(&mut store);
        Self {
            store,
            events: EventBus::new(),
            debug: Channel::new(),
            config,
            time,
            indices,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn indices(&self) -> SystemIndices {
        self.indices
    }

    pub fn events_mut(&mut self) -> &mut EventBus<SimEvent> {
        &mut self.events
    }

    pub fn debug_mut(&mut self) -> &mut Channel<DebugEvent> {
        &mut self.debug
    }

    /// Split borrow used to run systems outside of [`Sim::next`]
    pub fn context(&mut self, delta: f64) -> SimContext<'_> {
        SimContext {
            store: &mut self.store,
            events: &mut self.events,
            debug: &mut self.debug,
            config: &self.config,
            time: self.time,
            delta,
        }
    }

    /// Materialize an archetype component set and announce it
    pub fn spawn(&mut self, components: ComponentSet) -> EntityId {
        let archetype = components.archetype;
        let id = self.store.create_from_set(components);
        if let Some(archetype) = archetype {
            self.events.publish(&SimEvent::Spawned { id, archetype });
        }
        id
    }

    /// Remove an entity outside of combat (consumption, scripted removal)
    pub fn unregister(&mut self, id: EntityId) -> Result<()> {
        self.store.unregister(id)
    }

    pub fn enqueue(&mut self, id: EntityId, order: Order) -> Result<()> {
        orders::enqueue(&mut self.store, id, order)
    }

    pub fn enqueue_front(&mut self, id: EntityId, order: Order) -> Result<()> {
        orders::enqueue_front(&mut self.store, id, order)
    }

    pub fn remove_order(&mut self, id: EntityId, index: usize) -> Result<Option<Order>> {
        orders::remove_order(&mut self.store, &mut self.events, id, index)
    }

    pub fn clear_orders(&mut self, id: EntityId) -> Result<()> {
        orders::clear_orders(&mut self.store, &mut self.events, id)
    }

    pub fn transfer_ownership(&mut self, id: EntityId, new_owner: EntityId) -> Result<()> {
        ownership::transfer_ownership(&mut self.store, &mut self.events, id, new_owner)
    }

    /// Advance the world by `delta` simulated seconds.
    pub fn next(&mut self, delta: f64) -> Result<()> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(SimError::Config(format!("invalid tick delta {delta}")));
        }

        let indices = self.indices;
        let mut ctx = self.context(delta);

        systems::auto_order_system(&mut ctx, &indices)?;
        orders::order_system(&mut ctx, indices.orders);
        systems::production_system(&mut ctx, indices.production)?;
        systems::mission_system(&mut ctx, indices.missions)?;

        self.time += delta;
        Ok(())
    }
}

impl Default for Sim {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl std::fmt::Debug for Sim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sim")
            .field("time", &self.time)
            .field("entities", &self.store.len())
            .field("next_id", &self.store.next_id())
            .finish_non_exhaustive()
    }
}
