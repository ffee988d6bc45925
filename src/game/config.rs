//! Game Tunables
//!
//! Every gameplay number lives here, grouped by concern. All fields
//! default, so a config file only needs to name what it overrides. The
//! whole tree ships to clients in the welcome message so prediction
//! runs on server numbers.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Arena dimensions and seed
    pub world: WorldConfig,
    /// Combatant body and resource numbers
    pub combatant: CombatantConfig,
    /// Projectile numbers
    pub spell: SpellConfig,
    /// Damage-over-time numbers
    pub burn: BurnConfig,
    /// Death and protection windows
    pub respawn: RespawnConfig,
    /// Area burst numbers
    pub burst: BurstConfig,
    /// Bot behavior numbers
    pub bot: BotConfig,
    /// Pickup spawn numbers
    pub item: ItemConfig,
}

/// Arena dimensions and the generation seed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Arena width
    pub width: f32,
    /// Arena height
    pub height: f32,
    /// Seed string; hashed to the generator seed
    pub seed: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 2000.0,
            seed: "emberclash".to_string(),
        }
    }
}

/// Body, movement, and resource numbers shared by humans and bots.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantConfig {
    /// Maximum health
    pub max_health: f32,
    /// Maximum mana
    pub max_mana: f32,
    /// Mana regenerated per second
    pub mana_regen_per_sec: f32,
    /// Base movement speed (px/s)
    pub base_speed: f32,
    /// Acceleration (px/s^2)
    pub acceleration: f32,
    /// Deceleration (px/s^2)
    pub deceleration: f32,
    /// Collision radius
    pub radius: f32,
    /// Extra clearance required at spawn positions
    pub spawn_margin: f32,
}

impl Default for CombatantConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_mana: 100.0,
            mana_regen_per_sec: 4.0,
            base_speed: 220.0,
            acceleration: 900.0,
            deceleration: 1200.0,
            radius: 20.0,
            spawn_margin: 10.0,
        }
    }
}

/// Projectile numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellConfig {
    /// Travel speed (px/s)
    pub speed: f32,
    /// Damage on hit
    pub damage: f32,
    /// Mana cost per cast
    pub mana_cost: f32,
    /// Backward velocity applied to the caster
    pub recoil_force: f32,
    /// Speed buff granted when casting while retreating
    pub kite_boost_multiplier: f32,
    /// Kite boost duration (ms)
    pub kite_boost_duration_ms: u64,
    /// Projectile lifetime ceiling (ms)
    pub max_lifetime_ms: u64,
}

impl Default for SpellConfig {
    fn default() -> Self {
        Self {
            speed: 600.0,
            damage: 15.0,
            mana_cost: 5.0,
            recoil_force: 120.0,
            kite_boost_multiplier: 0.5,
            kite_boost_duration_ms: 900,
            max_lifetime_ms: 4000,
        }
    }
}

/// Damage-over-time applied by spell hits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnConfig {
    /// Burn duration from the most recent hit (ms)
    pub duration_ms: u64,
    /// Damage per tick
    pub tick_damage: f32,
    /// Interval between ticks (ms)
    pub tick_interval_ms: u64,
}

impl Default for BurnConfig {
    fn default() -> Self {
        Self {
            duration_ms: 10_000,
            tick_damage: 2.0,
            tick_interval_ms: 1000,
        }
    }
}

/// Death handling and the post-respawn protection windows.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RespawnConfig {
    /// Delay between death and respawn (ms)
    pub delay_ms: u64,
    /// Damage immunity after respawn (ms)
    pub protection_ms: u64,
    /// Movement-validation immunity after respawn (ms)
    pub movement_immunity_ms: u64,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            delay_ms: 3000,
            protection_ms: 3000,
            movement_immunity_ms: 1000,
        }
    }
}

/// Area burst numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Effect radius
    pub radius: f32,
    /// Damage per victim
    pub damage: f32,
    /// Mana cost per detonation
    pub mana_cost: f32,
    /// Minimum time between detonations (ms)
    pub cooldown_ms: u64,
    /// Health restored per burst kill
    pub kill_health_reward: f32,
    /// Mana restored per burst kill
    pub kill_mana_reward: f32,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            radius: 150.0,
            damage: 40.0,
            mana_cost: 20.0,
            cooldown_ms: 2000,
            kill_health_reward: 25.0,
            kill_mana_reward: 25.0,
        }
    }
}

/// Bot behavior numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Target bot population
    pub count: u32,
    /// Sight distance
    pub vision_range: f32,
    /// Delay between acquiring a target and the first shot (ms)
    pub reaction_delay_ms: u64,
    /// Minimum time between shots (ms)
    pub shoot_cooldown_ms: u64,
    /// How much target speed widens aim error
    pub inaccuracy: f32,
    /// Maximum aim error (radians)
    pub max_aim_error: f32,
    /// How far bots look for pickups
    pub item_scan_radius: f32,
    /// Closer than this, back off
    pub engage_min: f32,
    /// Farther than this, close in
    pub engage_max: f32,
    /// Time between wander target changes (ms)
    pub wander_interval_ms: u64,
    /// Below this mana fraction, hunt mana pickups first
    pub low_mana_fraction: f32,
    /// Chance a dead bot is replaced by a newcomer instead of respawning
    pub replace_probability: f32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            count: 4,
            vision_range: 600.0,
            reaction_delay_ms: 400,
            shoot_cooldown_ms: 900,
            inaccuracy: 0.35,
            max_aim_error: 0.22,
            item_scan_radius: 700.0,
            engage_min: 160.0,
            engage_max: 320.0,
            wander_interval_ms: 2500,
            low_mana_fraction: 0.3,
            replace_probability: 0.3,
        }
    }
}

/// Pickup spawn caps, intervals, and effect sizes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    /// Maximum live mana pickups
    pub mana_cap: u32,
    /// Interval between mana spawns (ms)
    pub mana_interval_ms: u64,
    /// Mana restored per pickup
    pub mana_restore: f32,
    /// Maximum live speed pickups
    pub speed_cap: u32,
    /// Interval between speed spawns (ms)
    pub speed_interval_ms: u64,
    /// Speed buff multiplier contribution
    pub speed_multiplier: f32,
    /// Speed buff duration (ms)
    pub speed_duration_ms: u64,
    /// Maximum live burst-charge pickups
    pub charge_cap: u32,
    /// Interval between burst-charge spawns (ms)
    pub charge_interval_ms: u64,
    /// Collection distance
    pub pickup_radius: f32,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            mana_cap: 5,
            mana_interval_ms: 8000,
            mana_restore: 40.0,
            speed_cap: 3,
            speed_interval_ms: 12_000,
            speed_multiplier: 0.6,
            speed_duration_ms: 6000,
            charge_cap: 2,
            charge_interval_ms: 20_000,
            pickup_radius: 28.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = GameConfig::default();
        assert_eq!(config.world.width, 2000.0);
        assert_eq!(config.combatant.max_health, 100.0);
        assert!(config.respawn.movement_immunity_ms < config.respawn.protection_ms);
        assert!(config.bot.engage_min < config.bot.engage_max);
    }

    #[test]
    fn test_partial_overlay_keeps_other_defaults() {
        let config: GameConfig = serde_json::from_str(
            r#"{"world":{"seed":"tournament"},"bot":{"count":8}}"#,
        )
        .unwrap();
        assert_eq!(config.world.seed, "tournament");
        assert_eq!(config.world.width, 2000.0);
        assert_eq!(config.bot.count, 8);
        assert_eq!(config.bot.vision_range, 600.0);
    }

    #[test]
    fn test_config_round_trips_for_welcome() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.spell.damage, config.spell.damage);
    }
}
