//! World State Definitions
//!
//! All live state for the arena. Uses BTreeMap for deterministic iteration
//! order; every mutation during a running tick goes through the `World`
//! owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::rng::Lcg;
use crate::core::vec2::Vec2;
use crate::game::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::items::Item;
use crate::world::geometry::Wall;

// =============================================================================
// ENTITY ID
// =============================================================================

/// Unique combatant identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct EntityId(pub [u8; 16]);

impl EntityId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Short hex form for logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

// =============================================================================
// COMBATANT
// =============================================================================

/// Timed speed buff. Contributes to the speed multiplier until expiry.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SpeedBuff {
    /// Additive multiplier contribution
    pub multiplier: f32,
    /// Expiry timestamp (ms)
    pub expires_at: u64,
}

/// Shared shape for human-controlled and bot-controlled entities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Combatant {
    /// Unique id
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Cosmetic color index
    pub color: u8,
    /// Current position
    pub position: Vec2,
    /// Current velocity
    pub velocity: Vec2,
    /// Facing direction (radians)
    pub facing: f32,
    /// Aim angle (radians)
    pub aim_angle: f32,
    /// Health, always in [0, max_health]
    pub health: f32,
    /// Mana, always in [0, max_mana]
    pub mana: f32,
    /// Kill count this life streak
    pub kills: u32,
    /// Alive flag; dead combatants receive no movement or regen updates
    pub alive: bool,
    /// Active timed speed buffs
    pub speed_buffs: Vec<SpeedBuff>,
    /// Currently burning
    pub burning: bool,
    /// Immune to incoming damage (fresh respawn)
    pub spawn_protected: bool,
    /// Movement validation suppressed (fresh respawn, expires first)
    pub movement_immune: bool,
    /// Held area-burst charges
    pub burst_charges: u32,
    /// Last burst detonation (ms), for cooldown enforcement
    pub last_burst_at: u64,
    /// Bot-controlled
    pub is_bot: bool,
    /// True until the first respawn; first spawns keep the kill streak
    pub first_spawn: bool,
}

impl Combatant {
    /// Create a freshly spawned combatant.
    pub fn new(id: EntityId, name: String, color: u8, position: Vec2, config: &GameConfig) -> Self {
        Self {
            id,
            name,
            color,
            position,
            velocity: Vec2::ZERO,
            facing: 0.0,
            aim_angle: 0.0,
            health: config.combatant.max_health,
            mana: config.combatant.max_mana,
            kills: 0,
            alive: true,
            speed_buffs: Vec::new(),
            burning: false,
            spawn_protected: true,
            movement_immune: true,
            burst_charges: 0,
            last_burst_at: 0,
            is_bot: false,
            first_spawn: true,
        }
    }

    /// Derived speed multiplier: 1 + sum of active buffs, capped at 3.0.
    pub fn speed_multiplier(&self, now: u64) -> f32 {
        let sum: f32 = self
            .speed_buffs
            .iter()
            .filter(|b| b.expires_at > now)
            .map(|b| b.multiplier)
            .sum();
        (1.0 + sum).min(3.0)
    }

    /// Add a timed speed buff.
    pub fn add_speed_buff(&mut self, multiplier: f32, duration_ms: u64, now: u64) {
        self.speed_buffs.push(SpeedBuff {
            multiplier,
            expires_at: now + duration_ms,
        });
    }

    /// Drop expired buffs.
    pub fn prune_speed_buffs(&mut self, now: u64) {
        self.speed_buffs.retain(|b| b.expires_at > now);
    }

    /// Apply damage, clamped at zero. Returns true if this killed.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.health <= 0.0
    }

    /// Has a boost currently active.
    pub fn is_boosted(&self, now: u64) -> bool {
        self.speed_buffs.iter().any(|b| b.expires_at > now)
    }
}

// =============================================================================
// SPELL
// =============================================================================

/// How many trailing positions a spell remembers.
const SPELL_TRAIL_LEN: usize = 8;

/// A projectile in flight. Travel is client-rendered; the server keeps the
/// record for hit validation and expiry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Spell {
    /// Unique spell id (monotonic counter)
    pub id: u64,
    /// Caster
    pub caster: EntityId,
    /// Cast origin
    pub origin: Vec2,
    /// Last reported position
    pub position: Vec2,
    /// Target point
    pub target: Vec2,
    /// Travel angle (radians)
    pub angle: f32,
    /// Travel speed
    pub speed: f32,
    /// Damage on hit
    pub damage: f32,
    /// Creation timestamp (ms)
    pub created_at: u64,
    /// Trailing position history (bounded)
    pub trail: Vec<Vec2>,
}

impl Spell {
    /// Record a new position, keeping a bounded trail.
    pub fn advance_to(&mut self, position: Vec2) {
        self.trail.push(self.position);
        if self.trail.len() > SPELL_TRAIL_LEN {
            self.trail.remove(0);
        }
        self.position = position;
    }
}

// =============================================================================
// BURN EFFECT
// =============================================================================

/// Per-victim burn record. Exists only while the victim is alive and burning.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BurnEffect {
    /// Expiry timestamp (ms)
    pub expires_at: u64,
    /// Last damage application (ms)
    pub last_tick_at: u64,
}

// =============================================================================
// WORLD
// =============================================================================

/// Single owner of all live arena state.
///
/// Walls are immutable after generation; the registries use BTreeMap so
/// every pass over them is deterministic.
#[derive(Debug)]
pub struct World {
    /// Static obstacle set
    pub walls: Vec<Wall>,
    /// Live combatants
    pub combatants: BTreeMap<EntityId, Combatant>,
    /// Live projectiles
    pub spells: BTreeMap<u64, Spell>,
    /// Live pickups
    pub items: BTreeMap<u32, Item>,
    /// Active burn effects keyed by victim
    pub burns: BTreeMap<EntityId, BurnEffect>,
    /// RNG for spawn search and item placement
    pub rng: Lcg,
    /// Next spell id (monotonic)
    pub next_spell_id: u64,
    /// Next item id (monotonic)
    pub next_item_id: u32,
    /// Events generated this tick (drained by the network layer)
    pub pending_events: Vec<GameEvent>,
}

impl World {
    /// Create a world with a pre-generated wall set.
    pub fn new(walls: Vec<Wall>, rng: Lcg) -> Self {
        Self {
            walls,
            combatants: BTreeMap::new(),
            spells: BTreeMap::new(),
            items: BTreeMap::new(),
            burns: BTreeMap::new(),
            rng,
            next_spell_id: 0,
            next_item_id: 0,
            pending_events: Vec::new(),
        }
    }

    /// Add a combatant.
    pub fn add_combatant(&mut self, combatant: Combatant) {
        self.combatants.insert(combatant.id, combatant);
    }

    /// Remove a combatant and everything keyed to it.
    ///
    /// Referential integrity only: the burn entry goes with the owner so a
    /// later burn pass never touches a missing entity.
    pub fn remove_combatant(&mut self, id: &EntityId) -> Option<Combatant> {
        self.burns.remove(id);
        self.combatants.remove(id)
    }

    /// Get a combatant by id.
    pub fn combatant(&self, id: &EntityId) -> Option<&Combatant> {
        self.combatants.get(id)
    }

    /// Get a combatant mutably by id.
    pub fn combatant_mut(&mut self, id: &EntityId) -> Option<&mut Combatant> {
        self.combatants.get_mut(id)
    }

    /// Register a new spell and return its id.
    pub fn add_spell(&mut self, mut spell: Spell) -> u64 {
        let id = self.next_spell_id;
        self.next_spell_id += 1;
        spell.id = id;
        self.spells.insert(id, spell);
        id
    }

    /// Remove a spell.
    pub fn remove_spell(&mut self, id: u64) -> Option<Spell> {
        self.spells.remove(&id)
    }

    /// Register a new item and return its id.
    pub fn add_item(&mut self, mut item: Item) -> u32 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        item.id = id;
        self.items.insert(id, item);
        id
    }

    /// Start or refresh a burn on a victim.
    pub fn apply_burn(&mut self, victim: EntityId, now: u64, duration_ms: u64) {
        self.burns.insert(
            victim,
            BurnEffect {
                expires_at: now + duration_ms,
                last_tick_at: now,
            },
        );
        if let Some(c) = self.combatants.get_mut(&victim) {
            c.burning = true;
        }
    }

    /// Clear a victim's burn. No-op for missing entities.
    pub fn clear_burn(&mut self, victim: &EntityId) {
        self.burns.remove(victim);
        if let Some(c) = self.combatants.get_mut(victim) {
            c.burning = false;
        }
    }

    /// Push a game event for broadcast.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Point-in-time snapshot of all combatants for outbound sync.
    pub fn combatant_snapshot(&self) -> Vec<Combatant> {
        self.combatants.values().cloned().collect()
    }

    /// Point-in-time snapshot of all items.
    pub fn item_snapshot(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }
}
