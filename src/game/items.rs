//! Pickups
//!
//! Three item kinds spawn on independent timers, each with its own live
//! cap. Collection happens server-side as a byproduct of movement.

use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;
use crate::game::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::state::{EntityId, World};
use crate::world::generator;

/// The closed set of pickup kinds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    /// Restores a fixed amount of mana
    Mana {
        /// Mana restored on pickup
        restore: f32,
    },
    /// Grants a timed speed buff
    Speed {
        /// Additive multiplier contribution
        multiplier: f32,
        /// Buff duration (ms)
        duration_ms: u64,
    },
    /// Grants one area-burst charge
    BurstCharge,
}

impl ItemKind {
    fn same_kind(&self, other: &ItemKind) -> bool {
        matches!(
            (self, other),
            (ItemKind::Mana { .. }, ItemKind::Mana { .. })
                | (ItemKind::Speed { .. }, ItemKind::Speed { .. })
                | (ItemKind::BurstCharge, ItemKind::BurstCharge)
        )
    }
}

/// A pickup on the ground.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    /// Unique id (monotonic)
    pub id: u32,
    /// What collecting it does
    pub kind: ItemKind,
    /// Where it sits
    pub position: Vec2,
    /// Spawn timestamp (ms)
    pub spawned_at: u64,
}

/// Zone size used when searching for an unobstructed item position.
const ITEM_RADIUS: f32 = 16.0;

/// Drives per-kind spawn timers.
#[derive(Debug, Default)]
pub struct ItemSpawner {
    last_mana: u64,
    last_speed: u64,
    last_charge: u64,
}

impl ItemSpawner {
    /// Create a spawner whose timers start at `now`, so the first wave
    /// lands one full interval in.
    pub fn new(now: u64) -> Self {
        Self {
            last_mana: now,
            last_speed: now,
            last_charge: now,
        }
    }

    /// Spawn any items whose interval has elapsed and whose cap has room.
    pub fn tick(&mut self, world: &mut World, config: &GameConfig, now: u64) {
        let items = &config.item;

        let mana_kind = ItemKind::Mana {
            restore: items.mana_restore,
        };
        if now.saturating_sub(self.last_mana) >= items.mana_interval_ms
            && count_kind(world, &mana_kind) < items.mana_cap
        {
            self.last_mana = now;
            spawn_item(world, config, mana_kind, now);
        }

        let speed_kind = ItemKind::Speed {
            multiplier: items.speed_multiplier,
            duration_ms: items.speed_duration_ms,
        };
        if now.saturating_sub(self.last_speed) >= items.speed_interval_ms
            && count_kind(world, &speed_kind) < items.speed_cap
        {
            self.last_speed = now;
            spawn_item(world, config, speed_kind, now);
        }

        if now.saturating_sub(self.last_charge) >= items.charge_interval_ms
            && count_kind(world, &ItemKind::BurstCharge) < items.charge_cap
        {
            self.last_charge = now;
            spawn_item(world, config, ItemKind::BurstCharge, now);
        }
    }
}

fn count_kind(world: &World, kind: &ItemKind) -> u32 {
    world.items.values().filter(|i| i.kind.same_kind(kind)).count() as u32
}

fn spawn_item(world: &mut World, config: &GameConfig, kind: ItemKind, now: u64) {
    let position = generator::safe_spawn_position(
        &world.walls,
        config.world.width,
        config.world.height,
        ITEM_RADIUS,
        0.0,
        &mut world.rng,
    );
    let item = Item {
        id: 0,
        kind,
        position,
        spawned_at: now,
    };
    let id = world.add_item(item.clone());
    let mut stored = item;
    stored.id = id;
    world.push_event(GameEvent::ItemSpawned { item: stored });
}

/// Collect every item within pickup range of a combatant.
///
/// Called after the combatant's position has been updated. Dead or
/// missing combatants collect nothing.
pub fn collect_items(world: &mut World, config: &GameConfig, id: &EntityId, now: u64) {
    let (position, alive) = match world.combatant(id) {
        Some(c) => (c.position, c.alive),
        None => return,
    };
    if !alive {
        return;
    }

    let radius = config.item.pickup_radius;
    let collected: Vec<(u32, ItemKind)> = world
        .items
        .values()
        .filter(|item| item.position.distance(position) <= radius)
        .map(|item| (item.id, item.kind))
        .collect();

    for (item_id, kind) in collected {
        world.items.remove(&item_id);
        world.push_event(GameEvent::ItemCollected {
            item_id,
            collector: *id,
        });
        apply_item(world, config, id, kind, now);
    }
}

fn apply_item(world: &mut World, config: &GameConfig, id: &EntityId, kind: ItemKind, now: u64) {
    let max_mana = config.combatant.max_mana;
    let Some(combatant) = world.combatant_mut(id) else {
        return;
    };
    match kind {
        ItemKind::Mana { restore } => {
            combatant.mana = (combatant.mana + restore).min(max_mana);
            let mana = combatant.mana;
            world.push_event(GameEvent::ManaChanged { id: *id, mana });
        }
        ItemKind::Speed {
            multiplier,
            duration_ms,
        } => {
            combatant.add_speed_buff(multiplier, duration_ms, now);
        }
        ItemKind::BurstCharge => {
            combatant.burst_charges += 1;
            let charges = combatant.burst_charges;
            world.push_event(GameEvent::BurstChargesChanged { id: *id, charges });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Lcg;
    use crate::game::state::Combatant;

    fn world_with_combatant() -> (World, EntityId) {
        let mut world = World::new(Vec::new(), Lcg::new(7));
        let id = EntityId::new([1; 16]);
        let c = Combatant::new(
            id,
            "picker".into(),
            0,
            Vec2::new(500.0, 500.0),
            &GameConfig::default(),
        );
        world.add_combatant(c);
        (world, id)
    }

    #[test]
    fn test_spawner_respects_cap() {
        let config = GameConfig::default();
        let mut world = World::new(Vec::new(), Lcg::new(7));
        let mut spawner = ItemSpawner::new(0);

        // Drive far past many intervals; cap must hold for every kind.
        for step in 1..200u64 {
            spawner.tick(&mut world, &config, step * config.item.mana_interval_ms);
        }
        let mana_count = world
            .items
            .values()
            .filter(|i| matches!(i.kind, ItemKind::Mana { .. }))
            .count() as u32;
        assert_eq!(mana_count, config.item.mana_cap);
    }

    #[test]
    fn test_no_spawn_before_interval() {
        let config = GameConfig::default();
        let mut world = World::new(Vec::new(), Lcg::new(7));
        let mut spawner = ItemSpawner::new(0);

        spawner.tick(&mut world, &config, config.item.mana_interval_ms - 1);
        assert!(world.items.is_empty());
    }

    #[test]
    fn test_mana_pickup_restores_and_clamps() {
        let config = GameConfig::default();
        let (mut world, id) = world_with_combatant();
        world.combatant_mut(&id).unwrap().mana = 80.0;
        world.add_item(Item {
            id: 0,
            kind: ItemKind::Mana { restore: 40.0 },
            position: Vec2::new(500.0, 510.0),
            spawned_at: 0,
        });

        collect_items(&mut world, &config, &id, 1000);

        assert!(world.items.is_empty());
        assert_eq!(world.combatant(&id).unwrap().mana, config.combatant.max_mana);
    }

    #[test]
    fn test_speed_pickup_grants_buff() {
        let config = GameConfig::default();
        let (mut world, id) = world_with_combatant();
        world.add_item(Item {
            id: 0,
            kind: ItemKind::Speed {
                multiplier: 0.6,
                duration_ms: 6000,
            },
            position: Vec2::new(505.0, 500.0),
            spawned_at: 0,
        });

        collect_items(&mut world, &config, &id, 1000);

        let c = world.combatant(&id).unwrap();
        assert!(c.is_boosted(2000));
        assert!(!c.is_boosted(8000));
    }

    #[test]
    fn test_out_of_range_item_stays() {
        let config = GameConfig::default();
        let (mut world, id) = world_with_combatant();
        world.add_item(Item {
            id: 0,
            kind: ItemKind::BurstCharge,
            position: Vec2::new(900.0, 900.0),
            spawned_at: 0,
        });

        collect_items(&mut world, &config, &id, 1000);

        assert_eq!(world.items.len(), 1);
        assert_eq!(world.combatant(&id).unwrap().burst_charges, 0);
    }

    #[test]
    fn test_dead_combatant_collects_nothing() {
        let config = GameConfig::default();
        let (mut world, id) = world_with_combatant();
        world.combatant_mut(&id).unwrap().alive = false;
        world.add_item(Item {
            id: 0,
            kind: ItemKind::BurstCharge,
            position: Vec2::new(500.0, 500.0),
            spawned_at: 0,
        });

        collect_items(&mut world, &config, &id, 1000);
        assert_eq!(world.items.len(), 1);
    }
}
