//! Bot Stack
//!
//! Server-driven combatants. Each bot runs the same sense-decide-act
//! loop every bot tick: perceive the world, pick a goal by priority,
//! then steer and shoot. Navigation goes through a shared A* grid built
//! once from the generated walls.

pub mod combat;
pub mod decision;
pub mod movement;
pub mod pathfind;
pub mod perception;

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::rng::Lcg;
use crate::core::vec2::Vec2;
use crate::game::config::GameConfig;
use crate::game::scheduler::Scheduler;
use crate::game::state::{EntityId, World};
use crate::game::{join_combatant, leave_combatant};

use combat::FireControl;
use decision::BotGoal;
use pathfind::NavGrid;

/// Waypoint arrival tolerance.
const WAYPOINT_RADIUS: f32 = 24.0;
/// Replan when the goal drifts this far from the path's destination.
const REPLAN_DRIFT: f32 = 80.0;
/// A bot that moves less than this over the stuck window is stuck.
const STUCK_DISTANCE: f32 = 6.0;
/// How long a bot may fail to make progress before replanning.
const STUCK_WINDOW_MS: u64 = 1500;

const BOT_NAMES: &[&str] = &[
    "Cinder", "Vex", "Mordra", "Ashwick", "Pyrrha", "Soot", "Kindle", "Charvex",
    "Emberlyn", "Scorch", "Fumen", "Blaze", "Tindra", "Wick", "Smolder", "Ignis",
];

/// Per-bot working memory between ticks.
#[derive(Debug)]
struct BotBrain {
    fire: FireControl,
    path: Vec<Vec2>,
    path_index: usize,
    destination: Option<Vec2>,
    wander_target: Option<Vec2>,
    next_wander_at: u64,
    last_position: Vec2,
    last_progress_at: u64,
    orbit_sign: f32,
    death_handled: bool,
}

impl BotBrain {
    fn new(position: Vec2, orbit_sign: f32) -> Self {
        Self {
            fire: FireControl::default(),
            path: Vec::new(),
            path_index: 0,
            destination: None,
            wander_target: None,
            next_wander_at: 0,
            last_position: position,
            last_progress_at: 0,
            orbit_sign,
            death_handled: false,
        }
    }

    fn clear_path(&mut self) {
        self.path.clear();
        self.path_index = 0;
        self.destination = None;
    }
}

/// Owns every bot's brain and drives the whole population.
pub struct BotRunner {
    brains: BTreeMap<EntityId, BotBrain>,
    grid: NavGrid,
    rng: Lcg,
    next_name: usize,
}

impl BotRunner {
    /// Build the runner and its navigation grid from the generated walls.
    pub fn new(world: &World, config: &GameConfig, seed: u32) -> Self {
        let grid = NavGrid::build(
            &world.walls,
            config.world.width,
            config.world.height,
            config.combatant.radius,
        );
        Self {
            brains: BTreeMap::new(),
            grid,
            rng: Lcg::new(seed),
            next_name: 0,
        }
    }

    /// Run one bot tick: population upkeep, then sense-decide-act for
    /// every living bot, then projectile simulation.
    pub fn tick(
        &mut self,
        world: &mut World,
        config: &GameConfig,
        scheduler: &mut Scheduler,
        dt_ms: u64,
        now: u64,
    ) {
        self.reap_and_replace(world, config, scheduler);
        self.maintain_population(world, config, scheduler, now);

        let ids: Vec<EntityId> = self.brains.keys().copied().collect();
        for id in ids {
            self.drive_one(world, config, scheduler, &id, dt_ms, now);
        }

        combat::simulate_spells(world, config, scheduler, dt_ms, now);
    }

    fn reap_and_replace(
        &mut self,
        world: &mut World,
        config: &GameConfig,
        scheduler: &mut Scheduler,
    ) {
        self.brains.retain(|id, _| world.combatant(id).is_some());

        let mut to_remove: Vec<EntityId> = Vec::new();
        for (id, brain) in self.brains.iter_mut() {
            let Some(c) = world.combatant(id) else { continue };
            if c.alive {
                if brain.death_handled {
                    // Came back via respawn; start fresh
                    brain.death_handled = false;
                    brain.clear_path();
                    brain.fire.drop_target();
                }
                continue;
            }
            if brain.death_handled {
                continue;
            }
            brain.death_handled = true;
            // Sometimes a dead bot leaves for good and a newcomer takes
            // its slot, so the roster rotates over a long session.
            if self.rng.chance(config.bot.replace_probability) {
                to_remove.push(*id);
            }
        }
        for id in to_remove {
            debug!(bot = %id.short(), "bot retired after death");
            leave_combatant(world, scheduler, &id);
            self.brains.remove(&id);
        }
    }

    fn maintain_population(
        &mut self,
        world: &mut World,
        config: &GameConfig,
        scheduler: &mut Scheduler,
        now: u64,
    ) {
        let bot_count = world.combatants.values().filter(|c| c.is_bot).count() as u32;
        for _ in bot_count..config.bot.count {
            let name = BOT_NAMES[self.next_name % BOT_NAMES.len()].to_string();
            let color = (self.next_name % 8) as u8;
            self.next_name += 1;
            let id = join_combatant(world, config, scheduler, name, color, true, now);
            let position = world.combatant(&id).map(|c| c.position).unwrap_or(Vec2::ZERO);
            let orbit_sign = if self.rng.chance(0.5) { 1.0 } else { -1.0 };
            self.brains.insert(id, BotBrain::new(position, orbit_sign));
            debug!(bot = %id.short(), "bot joined");
        }
    }

    fn drive_one(
        &mut self,
        world: &mut World,
        config: &GameConfig,
        scheduler: &mut Scheduler,
        id: &EntityId,
        dt_ms: u64,
        now: u64,
    ) {
        let Some(c) = world.combatant(id) else { return };
        if !c.alive {
            return;
        }
        let me = c.position;

        let seen = perception::perceive(world, config, id, now);
        let goal = decision::decide(&seen, config);
        let Some(brain) = self.brains.get_mut(id) else { return };

        // Stuck watchdog
        if me.distance(brain.last_position) > STUCK_DISTANCE {
            brain.last_position = me;
            brain.last_progress_at = now;
        } else if now.saturating_sub(brain.last_progress_at) > STUCK_WINDOW_MS {
            brain.clear_path();
            brain.wander_target = None;
            brain.orbit_sign = -brain.orbit_sign;
            brain.last_progress_at = now;
        }

        match goal {
            BotGoal::Engage(enemy) => {
                let point =
                    movement::engage_point(me, enemy.position, enemy.distance, config, brain.orbit_sign);
                // Tactical points go through the grid too, so a wall
                // between bot and orbit spot gets routed around
                Self::follow_path(&self.grid, world, config, brain, id, me, point, dt_ms, now);
                combat::try_fire(
                    world,
                    config,
                    scheduler,
                    &mut brain.fire,
                    &mut self.rng,
                    id,
                    &enemy,
                    now,
                );
            }
            BotGoal::SeekItem { x, y } => {
                brain.fire.drop_target();
                let target = Vec2::new(x, y);
                Self::follow_path(&self.grid, world, config, brain, id, me, target, dt_ms, now);
            }
            BotGoal::Wander => {
                brain.fire.drop_target();
                let target = Self::wander_target(
                    &self.grid,
                    &mut self.rng,
                    brain,
                    config,
                    me,
                    now,
                );
                Self::follow_path(&self.grid, world, config, brain, id, me, target, dt_ms, now);
            }
        }
    }

    fn wander_target(
        grid: &NavGrid,
        rng: &mut Lcg,
        brain: &mut BotBrain,
        config: &GameConfig,
        me: Vec2,
        now: u64,
    ) -> Vec2 {
        let arrived = brain
            .wander_target
            .map(|t| me.distance(t) < WAYPOINT_RADIUS * 2.0)
            .unwrap_or(true);
        if !arrived && now < brain.next_wander_at {
            return brain.wander_target.unwrap_or(me);
        }

        brain.next_wander_at = now + config.bot.wander_interval_ms;
        for _ in 0..12 {
            let candidate = Vec2::new(
                rng.range_f32(100.0, config.world.width - 100.0),
                rng.range_f32(100.0, config.world.height - 100.0),
            );
            if grid.is_walkable(candidate) {
                brain.wander_target = Some(candidate);
                brain.clear_path();
                return candidate;
            }
        }
        me
    }

    #[allow(clippy::too_many_arguments)]
    fn follow_path(
        grid: &NavGrid,
        world: &mut World,
        config: &GameConfig,
        brain: &mut BotBrain,
        id: &EntityId,
        me: Vec2,
        target: Vec2,
        dt_ms: u64,
        now: u64,
    ) {
        let stale = match brain.destination {
            Some(dest) => dest.distance(target) > REPLAN_DRIFT,
            None => true,
        };
        if stale || brain.path_index >= brain.path.len() {
            match pathfind::find_path(grid, me, target) {
                Some(path) => {
                    brain.path = path;
                    brain.path_index = 0;
                    brain.destination = Some(target);
                }
                None => {
                    brain.clear_path();
                    brain.wander_target = None;
                    return;
                }
            }
        }

        while brain.path_index < brain.path.len()
            && me.distance(brain.path[brain.path_index]) < WAYPOINT_RADIUS
        {
            brain.path_index += 1;
        }
        let waypoint = brain
            .path
            .get(brain.path_index)
            .copied()
            .unwrap_or(target);
        movement::steer(world, config, id, waypoint, dt_ms, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (World, GameConfig, Scheduler, BotRunner) {
        let config = GameConfig::default();
        let world = World::new(Vec::new(), Lcg::new(21));
        let runner = BotRunner::new(&world, &config, 99);
        (world, config, Scheduler::new(), runner)
    }

    #[test]
    fn test_population_fills_to_configured_count() {
        let (mut world, config, mut sched, mut runner) = setup();
        runner.tick(&mut world, &config, &mut sched, 50, 0);

        let bots = world.combatants.values().filter(|c| c.is_bot).count() as u32;
        assert_eq!(bots, config.bot.count);
        // Every bot has a distinct name
        let names: std::collections::BTreeSet<String> = world
            .combatants
            .values()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names.len() as u32, config.bot.count);
    }

    #[test]
    fn test_bots_move_when_wandering() {
        let (mut world, config, mut sched, mut runner) = setup();
        runner.tick(&mut world, &config, &mut sched, 50, 0);

        let before: Vec<Vec2> = world.combatants.values().map(|c| c.position).collect();
        for step in 1..=40u64 {
            runner.tick(&mut world, &config, &mut sched, 50, step * 50);
        }
        let after: Vec<Vec2> = world.combatants.values().map(|c| c.position).collect();

        let moved = before
            .iter()
            .zip(after.iter())
            .filter(|(b, a)| b.distance(**a) > 10.0)
            .count();
        assert!(moved > 0, "at least one bot should have wandered");
    }

    #[test]
    fn test_missing_combatant_drops_brain() {
        let (mut world, config, mut sched, mut runner) = setup();
        runner.tick(&mut world, &config, &mut sched, 50, 0);

        let victim = *world.combatants.keys().next().unwrap();
        world.remove_combatant(&victim);
        runner.reap_and_replace(&mut world, &config, &mut sched);

        assert!(!runner.brains.contains_key(&victim));
    }
}
