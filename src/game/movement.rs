//! Movement Validation
//!
//! Clients simulate their own movement and report positions; the server
//! accepts or rejects. A rejected move leaves the authoritative position
//! untouched and the caller tells the client to snap back.

use crate::core::vec2::Vec2;
use crate::game::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::items;
use crate::game::state::{EntityId, World};
use crate::world::geometry;

/// Outcome of a reported move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveOutcome {
    /// Move accepted and applied
    Accepted,
    /// Move rejected; authoritative position unchanged
    Rejected(Vec2),
    /// Entity missing or dead
    Ignored,
}

/// Validate and apply a client-reported move.
///
/// Bounds are clamped rather than rejected; a wall overlap is a hard
/// reject unless the combatant is inside its post-respawn movement
/// immunity window.
pub fn apply_move(
    world: &mut World,
    config: &GameConfig,
    id: &EntityId,
    position: Vec2,
    velocity: Vec2,
    facing: f32,
    now: u64,
) -> MoveOutcome {
    let radius = config.combatant.radius;
    let (current, alive, immune) = match world.combatant(id) {
        Some(c) => (c.position, c.alive, c.movement_immune),
        None => return MoveOutcome::Ignored,
    };
    if !alive {
        return MoveOutcome::Ignored;
    }

    let clamped = clamp_to_arena(position, radius, config.world.width, config.world.height);

    if !immune && geometry::point_blocked(&world.walls, clamped.x, clamped.y, radius).is_some() {
        return MoveOutcome::Rejected(current);
    }

    if let Some(c) = world.combatant_mut(id) {
        c.position = clamped;
        c.velocity = velocity;
        c.facing = facing;
    }
    world.push_event(GameEvent::CombatantMoved {
        id: *id,
        position: clamped,
        velocity,
        facing,
    });

    items::collect_items(world, config, id, now);
    MoveOutcome::Accepted
}

/// Update a combatant's aim angle.
pub fn apply_aim(world: &mut World, id: &EntityId, angle: f32) {
    let Some(c) = world.combatant_mut(id) else {
        return;
    };
    if !c.alive {
        return;
    }
    c.aim_angle = angle;
    world.push_event(GameEvent::CombatantAimed { id: *id, angle });
}

/// Regenerate mana for every living combatant.
///
/// `dt_ms` is the elapsed time since the previous regen pass. Emits a
/// mana event only when the value actually changed.
pub fn regen_mana(world: &mut World, config: &GameConfig, dt_ms: u64) {
    let gain = config.combatant.mana_regen_per_sec * (dt_ms as f32 / 1000.0);
    let max = config.combatant.max_mana;

    let mut changed: Vec<(EntityId, f32)> = Vec::new();
    for c in world.combatants.values_mut() {
        if !c.alive || c.mana >= max {
            continue;
        }
        c.mana = (c.mana + gain).min(max);
        changed.push((c.id, c.mana));
    }
    for (id, mana) in changed {
        world.push_event(GameEvent::ManaChanged { id, mana });
    }
}

/// Expire finished speed buffs across all combatants.
pub fn prune_buffs(world: &mut World, now: u64) {
    for c in world.combatants.values_mut() {
        c.prune_speed_buffs(now);
    }
}

fn clamp_to_arena(position: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        position.x.clamp(radius, width - radius),
        position.y.clamp(radius, height - radius),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Lcg;
    use crate::game::state::Combatant;
    use crate::world::geometry::{Rect, Wall, WallKind};

    fn arena_with_wall() -> (World, EntityId, GameConfig) {
        let config = GameConfig::default();
        let wall = Wall::solid(0, WallKind::Straight, Rect::new(400.0, 400.0, 200.0, 14.0));
        let mut world = World::new(vec![wall], Lcg::new(3));
        let id = EntityId::new([1; 16]);
        let mut c = Combatant::new(
            id,
            "mover".into(),
            0,
            Vec2::new(200.0, 200.0),
            &config,
        );
        c.movement_immune = false;
        c.spawn_protected = false;
        world.add_combatant(c);
        (world, id, config)
    }

    #[test]
    fn test_open_move_accepted() {
        let (mut world, id, config) = arena_with_wall();
        let outcome = apply_move(
            &mut world,
            &config,
            &id,
            Vec2::new(250.0, 200.0),
            Vec2::new(220.0, 0.0),
            0.0,
            1000,
        );
        assert_eq!(outcome, MoveOutcome::Accepted);
        assert_eq!(world.combatant(&id).unwrap().position, Vec2::new(250.0, 200.0));
    }

    #[test]
    fn test_blocked_move_hard_rejected() {
        let (mut world, id, config) = arena_with_wall();
        let outcome = apply_move(
            &mut world,
            &config,
            &id,
            Vec2::new(450.0, 405.0),
            Vec2::ZERO,
            0.0,
            1000,
        );
        assert_eq!(outcome, MoveOutcome::Rejected(Vec2::new(200.0, 200.0)));
        // Authoritative position untouched
        assert_eq!(world.combatant(&id).unwrap().position, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn test_immunity_bypasses_wall_check() {
        let (mut world, id, config) = arena_with_wall();
        world.combatant_mut(&id).unwrap().movement_immune = true;
        let outcome = apply_move(
            &mut world,
            &config,
            &id,
            Vec2::new(450.0, 405.0),
            Vec2::ZERO,
            0.0,
            1000,
        );
        assert_eq!(outcome, MoveOutcome::Accepted);
    }

    #[test]
    fn test_bounds_clamped_not_rejected() {
        let (mut world, id, config) = arena_with_wall();
        let outcome = apply_move(
            &mut world,
            &config,
            &id,
            Vec2::new(-50.0, 100.0),
            Vec2::ZERO,
            0.0,
            1000,
        );
        assert_eq!(outcome, MoveOutcome::Accepted);
        let r = config.combatant.radius;
        assert_eq!(world.combatant(&id).unwrap().position, Vec2::new(r, 100.0));
    }

    #[test]
    fn test_dead_combatant_ignored() {
        let (mut world, id, config) = arena_with_wall();
        world.combatant_mut(&id).unwrap().alive = false;
        let outcome = apply_move(
            &mut world,
            &config,
            &id,
            Vec2::new(250.0, 200.0),
            Vec2::ZERO,
            0.0,
            1000,
        );
        assert_eq!(outcome, MoveOutcome::Ignored);
    }

    #[test]
    fn test_mana_regen_clamps_at_max() {
        let (mut world, id, config) = arena_with_wall();
        world.combatant_mut(&id).unwrap().mana = 99.5;
        regen_mana(&mut world, &config, 1000);
        assert_eq!(world.combatant(&id).unwrap().mana, config.combatant.max_mana);
        // Second pass at full mana emits nothing
        world.take_events();
        regen_mana(&mut world, &config, 1000);
        assert!(world.take_events().is_empty());
    }
}
