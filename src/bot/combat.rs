//! Bot Fire Control
//!
//! Bots shoot with a human-like cadence: a reaction delay after first
//! acquiring a target, a cooldown between shots, and deliberate aim
//! error that grows when the target is moving. Bot-cast projectiles have
//! no client to animate them, so their travel is simulated here.

use crate::core::rng::Lcg;
use crate::core::vec2::Vec2;
use crate::game::combat as game_combat;
use crate::game::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::scheduler::Scheduler;
use crate::game::state::{EntityId, World};
use crate::world::geometry;

use super::perception::VisibleEnemy;

/// Per-bot firing state.
#[derive(Clone, Copy, Debug, Default)]
pub struct FireControl {
    /// Current target and when it was first acquired
    pub target_since: Option<(EntityId, u64)>,
    /// Last shot timestamp (ms)
    pub last_shot_at: u64,
}

impl FireControl {
    /// Forget the current target. The next sighting pays the full
    /// reaction delay again.
    pub fn drop_target(&mut self) {
        self.target_since = None;
    }
}

/// Consider attacking a visible enemy: detonate a banked burst when the
/// enemy is inside the blast radius, otherwise line up a ranged shot.
pub fn try_fire(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    fire: &mut FireControl,
    rng: &mut Lcg,
    bot: &EntityId,
    enemy: &VisibleEnemy,
    now: u64,
) {
    let can_burst = world
        .combatant(bot)
        .map(|c| {
            c.burst_charges > 0
                && c.mana >= config.burst.mana_cost
                && now.saturating_sub(c.last_burst_at) >= config.burst.cooldown_ms
        })
        .unwrap_or(false);
    if can_burst && enemy.distance <= config.burst.radius {
        let _ = game_combat::trigger_burst(world, config, scheduler, bot, now);
        return;
    }

    let acquired_at = match fire.target_since {
        Some((id, at)) if id == enemy.id => at,
        _ => {
            fire.target_since = Some((enemy.id, now));
            return;
        }
    };
    if now.saturating_sub(acquired_at) < config.bot.reaction_delay_ms {
        return;
    }
    if now.saturating_sub(fire.last_shot_at) < config.bot.shoot_cooldown_ms {
        return;
    }

    let Some(me) = world.combatant(bot) else {
        return;
    };
    let origin = me.position;

    // A shot a wall will eat is mana down the drain
    if geometry::segment_blocked(
        &world.walls,
        origin.x,
        origin.y,
        enemy.position.x,
        enemy.position.y,
    )
    .is_some()
    {
        return;
    }

    // Aim error widens against fast movers
    let speed_factor = 1.0 + config.bot.inaccuracy * (enemy.velocity.length() / config.combatant.base_speed);
    let error = (rng.next_f32() * 2.0 - 1.0) * config.bot.max_aim_error * speed_factor;
    let base = (enemy.position - origin).normalize();
    let angle = base.y.atan2(base.x) + error;
    let target = origin + Vec2::from_angle(angle).scale(enemy.distance.max(1.0));

    if game_combat::cast_spell(world, config, bot, target, now).is_ok() {
        fire.last_shot_at = now;
        if let Some(c) = world.combatant_mut(bot) {
            c.aim_angle = angle;
        }
        world.push_event(GameEvent::CombatantAimed { id: *bot, angle });
    }
}

/// Advance every bot-owned projectile and resolve its collisions.
pub fn simulate_spells(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    dt_ms: u64,
    now: u64,
) {
    let dt = dt_ms as f32 / 1000.0;
    let bot_spells: Vec<u64> = world
        .spells
        .values()
        .filter(|s| {
            world
                .combatant(&s.caster)
                .map(|c| c.is_bot)
                .unwrap_or(false)
        })
        .map(|s| s.id)
        .collect();

    for spell_id in bot_spells {
        let (from, to, caster) = {
            let Some(spell) = world.spells.get(&spell_id) else {
                continue;
            };
            let step = Vec2::from_angle(spell.angle).scale(spell.speed * dt);
            (spell.position, spell.position + step, spell.caster)
        };

        if geometry::segment_blocked(&world.walls, from.x, from.y, to.x, to.y).is_some() {
            let _ = game_combat::resolve_wall_impact(world, spell_id, to);
            continue;
        }

        let hit: Option<EntityId> = world
            .combatants
            .values()
            .filter(|c| c.id != caster && c.alive)
            .find(|c| segment_hits_circle(from, to, c.position, config.combatant.radius))
            .map(|c| c.id);

        if let Some(victim) = hit {
            let impact = world.combatant(&victim).map(|c| c.position).unwrap_or(to);
            let _ = game_combat::resolve_hit(
                world, config, scheduler, spell_id, &victim, impact, now,
            );
            continue;
        }

        if let Some(spell) = world.spells.get_mut(&spell_id) {
            spell.advance_to(to);
        }
    }
}

fn segment_hits_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        ((center - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    };
    let closest = a + ab.scale(t);
    closest.distance_squared(center) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Combatant;

    fn setup() -> (World, GameConfig, Scheduler, EntityId, EntityId) {
        let config = GameConfig::default();
        let mut world = World::new(Vec::new(), Lcg::new(17));

        let bot_id = EntityId::new([1; 16]);
        let mut bot = Combatant::new(bot_id, "bot".into(), 0, Vec2::new(300.0, 300.0), &config);
        bot.is_bot = true;
        bot.spawn_protected = false;
        world.add_combatant(bot);

        let enemy_id = EntityId::new([2; 16]);
        let mut enemy =
            Combatant::new(enemy_id, "enemy".into(), 1, Vec2::new(500.0, 300.0), &config);
        enemy.spawn_protected = false;
        world.add_combatant(enemy);

        (world, config, Scheduler::new(), bot_id, enemy_id)
    }

    fn visible(world: &World, id: &EntityId, me: Vec2) -> VisibleEnemy {
        let c = world.combatant(id).unwrap();
        VisibleEnemy {
            id: *id,
            position: c.position,
            distance: c.position.distance(me),
            velocity: c.velocity,
        }
    }

    #[test]
    fn test_reaction_delay_gates_first_shot() {
        let (mut world, config, mut sched, bot, enemy) = setup();
        let mut fire = FireControl::default();
        let mut rng = Lcg::new(1);
        let seen = visible(&world, &enemy, Vec2::new(300.0, 300.0));

        // First sighting only starts the clock
        try_fire(&mut world, &config, &mut sched, &mut fire, &mut rng, &bot, &seen, 1000);
        assert!(world.spells.is_empty());

        // Still inside the reaction window
        try_fire(&mut world, &config, &mut sched, &mut fire, &mut rng, &bot, &seen, 1100);
        assert!(world.spells.is_empty());

        // Past the window the shot lands
        try_fire(
            &mut world,
            &config,
            &mut sched,
            &mut fire,
            &mut rng,
            &bot,
            &seen,
            1000 + config.bot.reaction_delay_ms,
        );
        assert_eq!(world.spells.len(), 1);
    }

    #[test]
    fn test_shot_cooldown() {
        let (mut world, config, mut sched, bot, enemy) = setup();
        let mut fire = FireControl::default();
        let mut rng = Lcg::new(1);
        let seen = visible(&world, &enemy, Vec2::new(300.0, 300.0));
        let t0 = 1000 + config.bot.reaction_delay_ms;

        try_fire(&mut world, &config, &mut sched, &mut fire, &mut rng, &bot, &seen, 1000);
        try_fire(&mut world, &config, &mut sched, &mut fire, &mut rng, &bot, &seen, t0);
        assert_eq!(world.spells.len(), 1);

        try_fire(&mut world, &config, &mut sched, &mut fire, &mut rng, &bot, &seen, t0 + 100);
        assert_eq!(world.spells.len(), 1);

        try_fire(
            &mut world,
            &config,
            &mut sched,
            &mut fire,
            &mut rng,
            &bot,
            &seen,
            t0 + config.bot.shoot_cooldown_ms,
        );
        assert_eq!(world.spells.len(), 2);
    }

    #[test]
    fn test_switching_targets_resets_reaction() {
        let (mut world, config, mut sched, bot, enemy) = setup();
        let other = EntityId::new([3; 16]);
        let mut c = Combatant::new(other, "other".into(), 2, Vec2::new(300.0, 500.0), &config);
        c.spawn_protected = false;
        world.add_combatant(c);

        let mut fire = FireControl::default();
        let mut rng = Lcg::new(1);
        let first = visible(&world, &enemy, Vec2::new(300.0, 300.0));
        let second = visible(&world, &other, Vec2::new(300.0, 300.0));

        try_fire(&mut world, &config, &mut sched, &mut fire, &mut rng, &bot, &first, 1000);
        // New target restarts the clock
        try_fire(
            &mut world,
            &config,
            &mut sched,
            &mut fire,
            &mut rng,
            &bot,
            &second,
            1000 + config.bot.reaction_delay_ms,
        );
        assert!(world.spells.is_empty());
    }

    #[test]
    fn test_bot_spell_travels_and_hits() {
        let (mut world, config, mut sched, bot, enemy) = setup();
        game_combat::cast_spell(&mut world, &config, &bot, Vec2::new(500.0, 300.0), 0).unwrap();

        // 200px at 600px/s arrives within 400ms of simulation
        for step in 1..=10u64 {
            simulate_spells(&mut world, &config, &mut sched, 50, step * 50);
        }

        assert!(world.spells.is_empty());
        let v = world.combatant(&enemy).unwrap();
        assert_eq!(v.health, config.combatant.max_health - config.spell.damage);
    }

    #[test]
    fn test_bot_spell_stops_at_wall() {
        use crate::world::geometry::{Rect, Wall, WallKind};
        let (mut world, config, mut sched, bot, enemy) = setup();
        world
            .walls
            .push(Wall::solid(0, WallKind::Straight, Rect::new(400.0, 200.0, 14.0, 200.0)));
        game_combat::cast_spell(&mut world, &config, &bot, Vec2::new(500.0, 300.0), 0).unwrap();

        for step in 1..=10u64 {
            simulate_spells(&mut world, &config, &mut sched, 50, step * 50);
        }

        assert!(world.spells.is_empty());
        assert_eq!(
            world.combatant(&enemy).unwrap().health,
            config.combatant.max_health
        );
        let events = world.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::WallImpact { .. })));
    }

    #[test]
    fn test_banked_charge_detonates_on_close_enemy() {
        let (mut world, config, mut sched, bot, enemy) = setup();
        world.combatant_mut(&bot).unwrap().burst_charges = 1;
        // Pull the enemy inside the blast radius
        world.combatant_mut(&enemy).unwrap().position = Vec2::new(360.0, 300.0);

        let mut fire = FireControl::default();
        let mut rng = Lcg::new(1);
        let seen = visible(&world, &enemy, Vec2::new(300.0, 300.0));
        try_fire(
            &mut world,
            &config,
            &mut sched,
            &mut fire,
            &mut rng,
            &bot,
            &seen,
            config.burst.cooldown_ms,
        );

        assert_eq!(world.combatant(&bot).unwrap().burst_charges, 0);
        assert_eq!(
            world.combatant(&enemy).unwrap().health,
            config.combatant.max_health - config.burst.damage
        );
        let events = world.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::AreaBurst { .. })));
    }

    #[test]
    fn test_no_shot_through_wall() {
        use crate::world::geometry::{Rect, Wall, WallKind};
        let (mut world, config, mut sched, bot, enemy) = setup();
        world
            .walls
            .push(Wall::solid(0, WallKind::Straight, Rect::new(400.0, 200.0, 14.0, 200.0)));

        let mut fire = FireControl::default();
        let mut rng = Lcg::new(1);
        let seen = visible(&world, &enemy, Vec2::new(300.0, 300.0));
        let mana_before = world.combatant(&bot).unwrap().mana;

        try_fire(&mut world, &config, &mut sched, &mut fire, &mut rng, &bot, &seen, 1000);
        try_fire(
            &mut world,
            &config,
            &mut sched,
            &mut fire,
            &mut rng,
            &bot,
            &seen,
            1000 + config.bot.reaction_delay_ms,
        );

        assert!(world.spells.is_empty());
        assert_eq!(world.combatant(&bot).unwrap().mana, mana_before);
    }

    #[test]
    fn test_dry_bot_holds_target_without_shooting() {
        let (mut world, config, mut sched, bot, enemy) = setup();
        world.combatant_mut(&bot).unwrap().mana = 3.0;

        let mut fire = FireControl::default();
        let mut rng = Lcg::new(1);
        let seen = visible(&world, &enemy, Vec2::new(300.0, 300.0));

        try_fire(&mut world, &config, &mut sched, &mut fire, &mut rng, &bot, &seen, 1000);
        try_fire(
            &mut world,
            &config,
            &mut sched,
            &mut fire,
            &mut rng,
            &bot,
            &seen,
            1000 + config.bot.reaction_delay_ms,
        );

        // The cast bounces off the mana check but the target is kept
        assert!(world.spells.is_empty());
        assert_eq!(fire.target_since.unwrap().0, enemy);
    }
}
