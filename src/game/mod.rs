//! Game Simulation
//!
//! The authoritative arena: configuration, world state, event plumbing,
//! the deferred-task scheduler, and the combat/movement/item resolvers.
//! Everything here is synchronous and owns no I/O; the network layer
//! drives it from a single task and drains its events.

pub mod combat;
pub mod config;
pub mod events;
pub mod items;
pub mod movement;
pub mod scheduler;
pub mod state;

pub use config::GameConfig;
pub use events::{EventRoute, GameEvent};
pub use scheduler::{Scheduler, TaskKind};
pub use state::{Combatant, EntityId, World};

use crate::game::scheduler::TaskKind as Task;
use crate::world::generator;

/// Admit a new combatant at a safe spawn position.
///
/// First spawns get the same protection windows as respawns.
pub fn join_combatant(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    name: String,
    color: u8,
    is_bot: bool,
    now: u64,
) -> EntityId {
    let id = EntityId::random();
    let position = generator::safe_spawn_position(
        &world.walls,
        config.world.width,
        config.world.height,
        config.combatant.radius,
        config.combatant.spawn_margin,
        &mut world.rng,
    );
    let mut combatant = Combatant::new(id, name, color, position, config);
    combatant.is_bot = is_bot;
    world.add_combatant(combatant.clone());
    world.push_event(GameEvent::CombatantJoined { combatant });

    scheduler.schedule(
        id,
        Task::MovementImmunityEnd,
        now + config.respawn.movement_immunity_ms,
    );
    scheduler.schedule(
        id,
        Task::SpawnProtectionEnd,
        now + config.respawn.protection_ms,
    );
    id
}

/// Remove a combatant, cancel its timers, and retire its in-flight
/// spells.
pub fn leave_combatant(world: &mut World, scheduler: &mut Scheduler, id: &EntityId) {
    scheduler.cancel_all(id);
    let orphaned: Vec<u64> = world
        .spells
        .values()
        .filter(|s| s.caster == *id)
        .map(|s| s.id)
        .collect();
    for spell_id in orphaned {
        world.spells.remove(&spell_id);
        world.push_event(GameEvent::SpellEnded { spell_id });
    }
    if world.remove_combatant(id).is_some() {
        world.push_event(GameEvent::CombatantLeft { id: *id });
    }
}
