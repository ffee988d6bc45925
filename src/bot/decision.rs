//! Bot Decision Layer
//!
//! Strict priority order over the perception snapshot: survive first
//! (top up mana), fight what is visible, loot what is close, otherwise
//! wander. Firing is decided separately so a bot can shoot while doing
//! any of these.

use crate::game::config::GameConfig;

use super::perception::{NearbyItem, Perception, VisibleEnemy};

/// What a bot wants to do with its legs this tick.
#[derive(Clone, Copy, Debug)]
pub enum BotGoal {
    /// Fight a visible enemy at a tactical distance
    Engage(VisibleEnemy),
    /// Walk to a pickup
    SeekItem {
        /// Item position
        x: f32,
        /// Item position
        y: f32,
    },
    /// No stimulus; roam
    Wander,
}

/// Pick a goal from the perception snapshot.
pub fn decide(seen: &Perception, config: &GameConfig) -> BotGoal {
    // Starving for mana trumps everything when a refill is known
    if seen.mana_fraction < config.bot.low_mana_fraction {
        if let Some(item) = seen.mana_item {
            return seek(item);
        }
    }
    if let Some(enemy) = seen.enemy {
        return BotGoal::Engage(enemy);
    }
    // Idle stocking: a burst charge when none is banked, then a speed
    // boost when none is running, then whatever is closest
    if seen.burst_charges == 0 {
        if let Some(item) = seen.charge_item {
            return seek(item);
        }
    }
    if !seen.boosted {
        if let Some(item) = seen.speed_item {
            return seek(item);
        }
    }
    if let Some(item) = seen.item {
        return seek(item);
    }
    BotGoal::Wander
}

fn seek(item: NearbyItem) -> BotGoal {
    BotGoal::SeekItem {
        x: item.position.x,
        y: item.position.y,
    }
}
