//! Archetype constructors - conventional component sets for each kind of entity.
//!
//! Constructors return a [`ComponentSet`]; hand it to `Sim::spawn` (or
//! `EntityStore::create_from_set`) to materialize the entity.

use crate::components::*;

/// Ship blueprint
#[derive(Debug, Clone)]
pub struct ShipTemplate {
    pub name: String,
    pub texture: String,
    pub speed: f64,
    pub cargo: u64,
    pub hitpoints: f64,
    pub damage: Option<Damage>,
    pub mining_rate: Option<f64>,
    pub behavior: AutoOrderBehavior,
}

impl ShipTemplate {
    pub fn courier(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: "courier".into(),
            speed: 3.0,
            cargo: 20,
            hitpoints: 60.0,
            damage: None,
            mining_rate: None,
            behavior: AutoOrderBehavior::Hold,
        }
    }

    pub fn miner(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: "miner".into(),
            speed: 1.5,
            cargo: 100,
            hitpoints: 80.0,
            damage: None,
            mining_rate: Some(2.0),
            behavior: AutoOrderBehavior::Mine,
        }
    }

    pub fn fighter(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: "fighter".into(),
            speed: 4.0,
            cargo: 5,
            hitpoints: 100.0,
            damage: Some(Damage::new(10.0, 3.0)),
            mining_rate: None,
            behavior: AutoOrderBehavior::Escort,
        }
    }

    pub fn flagship(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: "flagship".into(),
            speed: 2.0,
            cargo: 200,
            hitpoints: 400.0,
            damage: Some(Damage::new(25.0, 5.0)),
            mining_rate: None,
            behavior: AutoOrderBehavior::Hold,
        }
    }
}

pub fn faction(name: &str, slug: &str, color: Color, money: i64, ai: bool) -> ComponentSet {
    ComponentSet {
        name: Some(Name::new(name)),
        archetype: Some(Archetype::Faction),
        faction: Some(Faction {
            slug: slug.to_string(),
            color,
            ai,
        }),
        budget: Some(Budget::new(money)),
        relations: Some(Relations::default()),
        ..Default::default()
    }
}

pub fn ship(template: &ShipTemplate, owner: EntityId, color: Color, position: Vec2) -> ComponentSet {
    ComponentSet {
        name: Some(Name::new(template.name.clone())),
        archetype: Some(Archetype::Ship),
        position: Some(Position {
            coord: position,
            angle: 0.0,
        }),
        movable: Some(Movable::new(template.speed)),
        storage: Some(Storage::new(template.cargo)),
        owner: Some(Owner { id: owner }),
        orders: Some(Orders::new()),
        auto_order: Some(AutoOrder::new(template.behavior)),
        subordinates: Some(Subordinates::default()),
        children: Some(Children::default()),
        render: Some(Render::new(template.texture.clone(), color)),
        hitpoints: Some(Hitpoints::new(template.hitpoints)),
        damage: template.damage,
        mining: template.mining_rate.map(Mining::new),
        ..Default::default()
    }
}

pub fn facility(
    name: &str,
    owner: EntityId,
    color: Color,
    position: Vec2,
    cargo: u64,
    production: Option<Recipe>,
) -> ComponentSet {
    ComponentSet {
        name: Some(Name::new(name)),
        archetype: Some(Archetype::Facility),
        position: Some(Position {
            coord: position,
            angle: 0.0,
        }),
        storage: Some(Storage::new(cargo)),
        owner: Some(Owner { id: owner }),
        children: Some(Children::default()),
        render: Some(Render::new("facility", color)),
        hitpoints: Some(Hitpoints::new(1000.0)),
        dock_pads: Some(DockPads::new(4)),
        production: production.map(Production::new),
        ..Default::default()
    }
}

pub fn asteroid(position: Vec2, commodity: Commodity, amount: u64) -> ComponentSet {
    ComponentSet {
        archetype: Some(Archetype::Asteroid),
        position: Some(Position {
            coord: position,
            angle: 0.0,
        }),
        mineable: Some(Mineable {
            commodity,
            remaining: amount,
        }),
        render: Some(Render::new("asteroid", Color::default())),
        ..Default::default()
    }
}

pub fn collectible(position: Vec2, storage: Storage) -> ComponentSet {
    ComponentSet {
        archetype: Some(Archetype::Collectible),
        position: Some(Position {
            coord: position,
            angle: 0.0,
        }),
        collectible: Some(Collectible {}),
        storage: Some(storage),
        render: Some(Render::new("crate", Color::default())),
        ..Default::default()
    }
}

/// Module or decoration mounted on another entity. Pass `owner` for parts
/// that change hands with their parent (turrets), `None` for pure visuals.
pub fn attachment(texture: &str, owner: Option<EntityId>, color: Color) -> ComponentSet {
    ComponentSet {
        archetype: Some(Archetype::Attachment),
        owner: owner.map(|id| Owner { id }),
        render: Some(Render::new(texture, color)),
        ..Default::default()
    }
}

pub fn mission(name: &str, mission: Mission) -> ComponentSet {
    ComponentSet {
        name: Some(Name::new(name)),
        archetype: Some(Archetype::Mission),
        mission: Some(mission),
        ..Default::default()
    }
}

/// Standard refinery recipe: ore into metals
pub fn refinery_recipe() -> Recipe {
    Recipe {
        input: [(Commodity::Ore, 10)].into_iter().collect(),
        output: [(Commodity::Metals, 2)].into_iter().collect(),
        duration: 30.0,
    }
}

impl Archetype {
    /// Components an entity of this archetype may omit in a snapshot and
    /// that are rebuilt from defaults on load
    pub fn defaultable(self) -> &'static [ComponentKind] {
        match self {
            Archetype::Faction => &[ComponentKind::Budget, ComponentKind::Relations],
            Archetype::Ship => &[
                ComponentKind::Orders,
                ComponentKind::AutoOrder,
                ComponentKind::Subordinates,
                ComponentKind::Children,
                ComponentKind::Render,
            ],
            Archetype::Facility => &[
                ComponentKind::Children,
                ComponentKind::Render,
                ComponentKind::DockPads,
            ],
            Archetype::Asteroid | Archetype::Collectible | Archetype::Attachment => {
                &[ComponentKind::Render]
            }
            Archetype::Mission => &[],
        }
    }

    /// Fill in any defaultable component the set lacks.
    /// Returns the kinds that were added.
    pub fn fill_defaults(self, set: &mut ComponentSet) -> Vec<ComponentKind> {
        let mut added = Vec::new();
        for kind in self.defaultable() {
            if set.has(*kind) {
                continue;
            }
            match kind {
                ComponentKind::Budget => set.budget = Some(Budget::default()),
                ComponentKind::Relations => set.relations = Some(Relations::default()),
                ComponentKind::Orders => set.orders = Some(Orders::default()),
                ComponentKind::AutoOrder => set.auto_order = Some(AutoOrder::default()),
                ComponentKind::Subordinates => set.subordinates = Some(Subordinates::default()),
                ComponentKind::Children => set.children = Some(Children::default()),
                ComponentKind::Render => set.render = Some(Render::default()),
                ComponentKind::DockPads => set.dock_pads = Some(DockPads::default()),
                _ => continue,
            }
            added.push(*kind);
        }
        added
    }
}
