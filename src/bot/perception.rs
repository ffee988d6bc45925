//! Bot Senses
//!
//! A perception pass distills the world into the few facts a bot's
//! decision layer cares about: the closest enemy in sensing range, and
//! the closest worthwhile pickup. Vision is range-gated only; walls do
//! not hide anyone, they only matter when the bot decides to shoot.

use crate::core::vec2::Vec2;
use crate::game::config::GameConfig;
use crate::game::items::ItemKind;
use crate::game::state::{EntityId, World};

/// An enemy within vision range.
#[derive(Clone, Copy, Debug)]
pub struct VisibleEnemy {
    /// Enemy id
    pub id: EntityId,
    /// Enemy position
    pub position: Vec2,
    /// Distance from the bot
    pub distance: f32,
    /// Enemy velocity, for aim leading
    pub velocity: Vec2,
}

/// A pickup worth walking to.
#[derive(Clone, Copy, Debug)]
pub struct NearbyItem {
    /// Item id
    pub id: u32,
    /// Item position
    pub position: Vec2,
    /// Distance from the bot
    pub distance: f32,
    /// Item kind
    pub kind: ItemKind,
}

/// What a bot knows this tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct Perception {
    /// Closest enemy within vision range, if any
    pub enemy: Option<VisibleEnemy>,
    /// Closest pickup in scan range, if any
    pub item: Option<NearbyItem>,
    /// Closest mana pickup specifically, for the low-mana priority
    pub mana_item: Option<NearbyItem>,
    /// Closest burst-charge pickup, if any
    pub charge_item: Option<NearbyItem>,
    /// Closest speed pickup, if any
    pub speed_item: Option<NearbyItem>,
    /// Own mana as a fraction of maximum
    pub mana_fraction: f32,
    /// Banked area-burst charges
    pub burst_charges: u32,
    /// Whether a speed buff is currently active
    pub boosted: bool,
}

/// Run the perception pass for one bot.
pub fn perceive(world: &World, config: &GameConfig, bot: &EntityId, now: u64) -> Perception {
    let Some(me) = world.combatant(bot) else {
        return Perception::default();
    };

    let mut enemy: Option<VisibleEnemy> = None;
    for other in world.combatants.values() {
        if other.id == *bot || !other.alive || other.spawn_protected {
            continue;
        }
        let distance = other.position.distance(me.position);
        if distance > config.bot.vision_range {
            continue;
        }
        if enemy.map(|e| distance >= e.distance).unwrap_or(false) {
            continue;
        }
        enemy = Some(VisibleEnemy {
            id: other.id,
            position: other.position,
            distance,
            velocity: other.velocity,
        });
    }

    let mut item: Option<NearbyItem> = None;
    let mut mana_item: Option<NearbyItem> = None;
    let mut charge_item: Option<NearbyItem> = None;
    let mut speed_item: Option<NearbyItem> = None;
    for candidate in world.items.values() {
        let distance = candidate.position.distance(me.position);
        if distance > config.bot.item_scan_radius {
            continue;
        }
        let found = NearbyItem {
            id: candidate.id,
            position: candidate.position,
            distance,
            kind: candidate.kind,
        };
        if item.map(|i| distance < i.distance).unwrap_or(true) {
            item = Some(found);
        }
        let slot = match candidate.kind {
            ItemKind::Mana { .. } => &mut mana_item,
            ItemKind::Speed { .. } => &mut speed_item,
            ItemKind::BurstCharge => &mut charge_item,
        };
        if slot.map(|i| distance < i.distance).unwrap_or(true) {
            *slot = Some(found);
        }
    }

    Perception {
        enemy,
        item,
        mana_item,
        charge_item,
        speed_item,
        mana_fraction: me.mana / config.combatant.max_mana,
        burst_charges: me.burst_charges,
        boosted: me.is_boosted(now),
    }
}
