//! SectorSim Core - deterministic sector simulation engine
//!
//! An entity-component simulation of a space sector: factions own ships
//! and stations, ships follow order queues, stations refine cargo and
//! missions pay out rewards.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Factions, ships, facilities, asteroids, missions
//! - **Components**: Pure data attached to entities (Position, Storage, Orders, etc.)
//! - **Indices**: Live id sets of entities carrying a given component set
//! - **Systems**: Logic that runs over indices once per tick
//!
//! Given the same snapshot and the same sequence of deltas, a [`Sim`]
//! always ends in the same state.
//!
//! # Example
//!
//! ```rust,no_run
//! use sectorsim_core::prelude::*;
//! use sectorsim_core::generation::generate_world;
//!
//! let mut sim = generate_world(&WorldGenConfig::default(), 7)?;
//! for _ in 0..600 {
//!     sim.next(0.1)?;
//! }
//! let snapshot = sim.serialize();
//! # Ok::<(), SimError>(())
//! ```

pub mod archetypes;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod generation;
pub mod headless;
pub mod index;
pub mod orders;
pub mod ownership;
pub mod rewards;
pub mod sim;
pub mod snapshot;
pub mod store;
pub mod systems;

pub use sim::Sim;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{SimConfig, WorldGenConfig};
    pub use crate::error::{Result, SimError};
    pub use crate::events::{DebugEvent, SimEvent, SimEventKind};
    pub use crate::headless::{fast_forward, HostMessage, Progress, Worker, WorkerMessage};
    pub use crate::orders::OrderStatus;
    pub use crate::sim::{Sim, SimContext};
    pub use crate::snapshot::Snapshot;
    pub use crate::store::EntityStore;
}
