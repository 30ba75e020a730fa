//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.
//!
//! Every component type is listed once in the registry below, which
//! generates its [`ComponentKind`] tag, the [`Component`] impl and the
//! matching optional field of [`ComponentSet`] (the snapshot record).

mod common;
mod economy;
mod faction;
mod mission;
mod orders;
mod ship;

pub use common::*;
pub use economy::*;
pub use faction::*;
pub use mission::*;
pub use orders::*;
pub use ship::*;

use serde::{Deserialize, Serialize};

/// A plain data record that can be attached to an entity through the store.
pub trait Component: hecs::Component + Clone {
    const KIND: ComponentKind;
}

macro_rules! component_registry {
    ($($field:ident : $ty:ty => $kind:ident),* $(,)?) => {
        /// Tag identifying a component type. Used for index predicates,
        /// runtime capability checks and snapshot keys.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum ComponentKind {
            $($kind,)*
        }

        impl ComponentKind {
            pub const ALL: &'static [ComponentKind] = &[$(ComponentKind::$kind,)*];

            /// Snapshot key of this kind
            pub fn name(self) -> &'static str {
                match self {
                    $(ComponentKind::$kind => stringify!($field),)*
                }
            }
        }

        $(impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$kind;
        })*

        /// Every component an entity may carry, as optionals.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct ComponentSet {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl ComponentSet {
            /// Copy every component off a live entity
            pub(crate) fn from_entity(entity: &hecs::EntityRef<'_>) -> Self {
                Self {
                    $($field: entity.get::<&$ty>().map(|c| (*c).clone()),)*
                }
            }

            pub(crate) fn into_builder(self) -> hecs::EntityBuilder {
                let mut builder = hecs::EntityBuilder::new();
                $(if let Some(c) = self.$field {
                    builder.add(c);
                })*
                builder
            }

            pub fn has(&self, kind: ComponentKind) -> bool {
                match kind {
                    $(ComponentKind::$kind => self.$field.is_some(),)*
                }
            }

            pub fn kinds(&self) -> Vec<ComponentKind> {
                ComponentKind::ALL
                    .iter()
                    .copied()
                    .filter(|kind| self.has(*kind))
                    .collect()
            }
        }

        pub(crate) fn entity_has_kind(entity: &hecs::EntityRef<'_>, kind: ComponentKind) -> bool {
            match kind {
                $(ComponentKind::$kind => entity.has::<$ty>(),)*
            }
        }
    };
}

component_registry! {
    name: Name => Name,
    archetype: Archetype => Archetype,
    position: Position => Position,
    movable: Movable => Movable,
    storage: Storage => Storage,
    owner: Owner => Owner,
    orders: Orders => Orders,
    auto_order: AutoOrder => AutoOrder,
    commander: Commander => Commander,
    subordinates: Subordinates => Subordinates,
    children: Children => Children,
    parent: Parent => Parent,
    render: Render => Render,
    faction: Faction => Faction,
    budget: Budget => Budget,
    relations: Relations => Relations,
    collectible: Collectible => Collectible,
    mineable: Mineable => Mineable,
    mining: Mining => Mining,
    hitpoints: Hitpoints => Hitpoints,
    damage: Damage => Damage,
    dock_pads: DockPads => DockPads,
    docked: Docked => Docked,
    production: Production => Production,
    mission: Mission => Mission,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // snapshot keys are camelCase, field names are snake_case
        match self {
            ComponentKind::AutoOrder => f.write_str("autoOrder"),
            ComponentKind::DockPads => f.write_str("dockPads"),
            other => f.write_str(other.name()),
        }
    }
}
