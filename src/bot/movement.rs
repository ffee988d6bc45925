//! Bot Locomotion
//!
//! Bots are simulated server-side, so unlike human movement there is no
//! report to validate; the server integrates velocity itself. Blocked
//! steps degrade gracefully: slide along one axis if possible, stop if
//! not, and push out radially if a bot ever ends up inside a footprint.

use crate::core::vec2::Vec2;
use crate::game::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::items;
use crate::game::state::{EntityId, World};
use crate::world::geometry;

/// Step a bot toward `target`, integrating acceleration over `dt_ms`.
pub fn steer(
    world: &mut World,
    config: &GameConfig,
    id: &EntityId,
    target: Vec2,
    dt_ms: u64,
    now: u64,
) {
    let dt = dt_ms as f32 / 1000.0;
    let radius = config.combatant.radius;
    let (position, velocity, multiplier, alive) = match world.combatant(id) {
        Some(c) => (c.position, c.velocity, c.speed_multiplier(now), c.alive),
        None => return,
    };
    if !alive {
        return;
    }

    let max_speed = config.combatant.base_speed * multiplier;
    let to_target = target - position;
    let mut velocity = if to_target.length() < 4.0 {
        // Arrived; bleed off speed
        decay(velocity, config.combatant.deceleration * dt)
    } else {
        let desired = to_target.normalize().scale(max_speed);
        let steering = desired - velocity;
        let step = config.combatant.acceleration * dt;
        if steering.length() <= step {
            desired
        } else {
            velocity + steering.normalize().scale(step)
        }
    };
    if velocity.length() > max_speed {
        velocity = velocity.normalize().scale(max_speed);
    }

    let proposed = position + velocity.scale(dt);
    let clamped = Vec2::new(
        proposed.x.clamp(radius, config.world.width - radius),
        proposed.y.clamp(radius, config.world.height - radius),
    );

    let resolved = if geometry::point_blocked(&world.walls, clamped.x, clamped.y, radius).is_none()
    {
        clamped
    } else {
        // Axis slide: keep whichever component still moves freely
        let slide_x = Vec2::new(clamped.x, position.y);
        let slide_y = Vec2::new(position.x, clamped.y);
        if geometry::point_blocked(&world.walls, slide_x.x, slide_x.y, radius).is_none() {
            velocity = Vec2::new(velocity.x, 0.0);
            slide_x
        } else if geometry::point_blocked(&world.walls, slide_y.x, slide_y.y, radius).is_none() {
            velocity = Vec2::new(0.0, velocity.y);
            slide_y
        } else {
            velocity = Vec2::ZERO;
            position
        }
    };

    let resolved = push_out(&world.walls, config, resolved, radius);
    let facing = if velocity.length_squared() > 1.0 {
        velocity.y.atan2(velocity.x)
    } else {
        world.combatant(id).map(|c| c.facing).unwrap_or(0.0)
    };

    if let Some(c) = world.combatant_mut(id) {
        c.position = resolved;
        c.velocity = velocity;
        c.facing = facing;
    }
    world.push_event(GameEvent::CombatantMoved {
        id: *id,
        position: resolved,
        velocity,
        facing,
    });
    items::collect_items(world, config, id, now);
}

/// Where a bot should stand relative to an enemy: close the gap when far,
/// back off when crowded, strafe sideways inside the band.
pub fn engage_point(me: Vec2, enemy: Vec2, distance: f32, config: &GameConfig, orbit_sign: f32) -> Vec2 {
    let away = (me - enemy).normalize();
    if distance > config.bot.engage_max {
        return enemy;
    }
    if distance < config.bot.engage_min {
        return me + away.scale(config.bot.engage_min);
    }
    // Orbit: step perpendicular to the enemy axis
    let tangent = Vec2::new(-away.y, away.x).scale(orbit_sign);
    me + tangent.scale(80.0)
}

fn decay(velocity: Vec2, step: f32) -> Vec2 {
    let speed = velocity.length();
    if speed <= step {
        Vec2::ZERO
    } else {
        velocity.normalize().scale(speed - step)
    }
}

/// Move a position out of any wall footprint it overlaps, to the
/// nearest free spot found by sweeping rings of growing radius. The
/// world center is the last resort.
fn push_out(
    walls: &[geometry::Wall],
    config: &GameConfig,
    position: Vec2,
    radius: f32,
) -> Vec2 {
    if geometry::point_blocked(walls, position.x, position.y, radius).is_none() {
        return position;
    }
    const SPOKES: u32 = 16;
    for ring in 1..=12 {
        let reach = ring as f32 * radius;
        for spoke in 0..SPOKES {
            let theta = spoke as f32 * std::f32::consts::TAU / SPOKES as f32;
            let candidate = position + Vec2::from_angle(theta).scale(reach);
            if candidate.x < radius
                || candidate.y < radius
                || candidate.x > config.world.width - radius
                || candidate.y > config.world.height - radius
            {
                continue;
            }
            if geometry::point_blocked(walls, candidate.x, candidate.y, radius).is_none() {
                return candidate;
            }
        }
    }
    Vec2::new(config.world.width / 2.0, config.world.height / 2.0)
}
