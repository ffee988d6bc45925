//! Game Events
//!
//! Everything the simulation wants clients to hear about. Events are
//! accumulated on the world during a tick and drained by the network
//! layer, which fans them out according to their routing.

use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;
use crate::game::items::Item;
use crate::game::state::{Combatant, EntityId};

/// Who a game event should reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventRoute {
    /// Every connected client
    Broadcast,
    /// Exactly one client
    ToOne(EntityId),
    /// Every client except one (typically the actor who already knows)
    ToOthers(EntityId),
}

/// An outbound state change produced by the simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A combatant entered the arena
    CombatantJoined {
        /// Full entity record
        combatant: Combatant,
    },
    /// A combatant left the arena
    CombatantLeft {
        /// Departed entity
        id: EntityId,
    },
    /// A combatant moved
    CombatantMoved {
        /// Moving entity
        id: EntityId,
        /// New position
        position: Vec2,
        /// New velocity
        velocity: Vec2,
        /// Facing direction (radians)
        facing: f32,
    },
    /// A combatant changed aim
    CombatantAimed {
        /// Aiming entity
        id: EntityId,
        /// Aim angle (radians)
        angle: f32,
    },
    /// A spell was cast
    SpellCast {
        /// Spell id
        spell_id: u64,
        /// Caster
        caster: EntityId,
        /// Origin point
        origin: Vec2,
        /// Target point
        target: Vec2,
        /// Travel angle (radians)
        angle: f32,
        /// Travel speed
        speed: f32,
    },
    /// A spell expired or was removed without a hit
    SpellEnded {
        /// Spell id
        spell_id: u64,
    },
    /// Health changed (damage, burn tick, kill reward)
    HealthChanged {
        /// Affected entity
        id: EntityId,
        /// New health value
        health: f32,
        /// Whether this change started or refreshed a burn
        burning: bool,
    },
    /// Mana changed (cast cost, regen, pickup, kill reward)
    ManaChanged {
        /// Affected entity
        id: EntityId,
        /// New mana value
        mana: f32,
    },
    /// A combatant died
    CombatantKilled {
        /// Credited killer, if any
        killer: Option<EntityId>,
        /// Victim
        victim: EntityId,
        /// Killer's updated kill count
        killer_kills: u32,
    },
    /// Private death notice with the respawn delay
    DeathNotice {
        /// Victim
        victim: EntityId,
        /// Milliseconds until respawn
        respawn_in_ms: u64,
    },
    /// A combatant respawned
    CombatantRespawned {
        /// Full refreshed record
        combatant: Combatant,
    },
    /// Spawn protection expired
    SpawnProtectionEnded {
        /// Affected entity
        id: EntityId,
    },
    /// A burn ran its course or its victim died
    BurnEnded {
        /// Affected entity
        id: EntityId,
    },
    /// A spell struck a wall
    WallImpact {
        /// Spell id
        spell_id: u64,
        /// Impact point
        position: Vec2,
    },
    /// An area burst detonated
    AreaBurst {
        /// Burst owner
        caster: EntityId,
        /// Detonation center
        position: Vec2,
        /// Effect radius
        radius: f32,
        /// Entities damaged
        victims: Vec<EntityId>,
    },
    /// Burst charge count changed
    BurstChargesChanged {
        /// Affected entity
        id: EntityId,
        /// New charge count
        charges: u32,
    },
    /// A pickup appeared
    ItemSpawned {
        /// Full item record
        item: Item,
    },
    /// A pickup was collected
    ItemCollected {
        /// Item id
        item_id: u32,
        /// Collector
        collector: EntityId,
    },
}

impl GameEvent {
    /// Who this event should be delivered to.
    pub fn route(&self) -> EventRoute {
        match self {
            // Actor already applied the change locally; echoing it back
            // would fight client prediction.
            GameEvent::CombatantMoved { id, .. } => EventRoute::ToOthers(*id),
            GameEvent::CombatantAimed { id, .. } => EventRoute::ToOthers(*id),
            GameEvent::DeathNotice { victim, .. } => EventRoute::ToOne(*victim),
            _ => EventRoute::Broadcast,
        }
    }
}
