//! Combat Resolution
//!
//! Spell casting, client-reported hit validation, burn damage-over-time,
//! area bursts, and the death/respawn cycle. Clients animate projectile
//! travel; the server owns every damage number and re-validates line of
//! sight before trusting a reported hit.

use thiserror::Error;
use tracing::debug;

use crate::core::vec2::Vec2;
use crate::game::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::scheduler::{Scheduler, TaskKind};
use crate::game::state::{EntityId, Spell, World};
use crate::world::{generator, geometry};

/// Tolerance added to the victim radius when checking a reported hit
/// position, covering one frame of client-side travel.
const HIT_SLOP: f32 = 24.0;

/// Why a combat action was refused.
#[derive(Debug, Error, PartialEq)]
pub enum CombatError {
    /// Actor does not exist
    #[error("unknown combatant")]
    UnknownCombatant,
    /// Actor is dead
    #[error("combatant is dead")]
    Dead,
    /// Not enough mana for the action
    #[error("insufficient mana: have {have}, need {need}")]
    InsufficientMana {
        /// Current mana
        have: f32,
        /// Required mana
        need: f32,
    },
    /// No spell with the reported id
    #[error("unknown spell")]
    UnknownSpell,
    /// Reported hit position is nowhere near the victim
    #[error("hit position out of range")]
    HitOutOfRange,
    /// A wall sits between the spell and the reported impact
    #[error("line of sight blocked")]
    LineBlocked,
    /// Victim is under spawn protection
    #[error("victim is protected")]
    Protected,
    /// A spell cannot strike its own caster
    #[error("self hit rejected")]
    SelfHit,
    /// No burst charge held
    #[error("no burst charges")]
    NoCharges,
    /// Burst still on cooldown
    #[error("burst on cooldown")]
    OnCooldown,
}

// =============================================================================
// CASTING
// =============================================================================

/// Cast a spell toward a target point. Returns the new spell id.
///
/// Deducts mana, applies recoil to the caster's velocity, and grants the
/// kite boost when the caster is moving away from the target.
pub fn cast_spell(
    world: &mut World,
    config: &GameConfig,
    caster: &EntityId,
    target: Vec2,
    now: u64,
) -> Result<u64, CombatError> {
    let cost = config.spell.mana_cost;
    let (origin, velocity) = {
        let c = world
            .combatant(caster)
            .ok_or(CombatError::UnknownCombatant)?;
        if !c.alive {
            return Err(CombatError::Dead);
        }
        if c.mana < cost {
            return Err(CombatError::InsufficientMana {
                have: c.mana,
                need: cost,
            });
        }
        (c.position, c.velocity)
    };

    let dir = (target - origin).normalize();
    let angle = dir.y.atan2(dir.x);
    let kiting = velocity.dot(dir) < 0.0 && velocity.length_squared() > 1.0;

    {
        let c = world
            .combatant_mut(caster)
            .ok_or(CombatError::UnknownCombatant)?;
        c.mana -= cost;
        c.velocity = c.velocity - dir.scale(config.spell.recoil_force);
        if kiting {
            c.add_speed_buff(
                config.spell.kite_boost_multiplier,
                config.spell.kite_boost_duration_ms,
                now,
            );
        }
    }
    let mana = world.combatant(caster).map(|c| c.mana).unwrap_or(0.0);
    world.push_event(GameEvent::ManaChanged { id: *caster, mana });

    let spell_id = world.add_spell(Spell {
        id: 0,
        caster: *caster,
        origin,
        position: origin,
        target,
        angle,
        speed: config.spell.speed,
        damage: config.spell.damage,
        created_at: now,
        trail: Vec::new(),
    });
    world.push_event(GameEvent::SpellCast {
        spell_id,
        caster: *caster,
        origin,
        target,
        angle,
        speed: config.spell.speed,
    });
    Ok(spell_id)
}

// =============================================================================
// HIT RESOLUTION
// =============================================================================

/// Validate and apply a client-reported spell hit.
///
/// The server re-derives everything a hostile client could lie about:
/// the impact must be within touch distance of the victim, and the path
/// from the cast origin to the impact must be wall-free.
pub fn resolve_hit(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    spell_id: u64,
    victim: &EntityId,
    impact: Vec2,
    now: u64,
) -> Result<(), CombatError> {
    let (caster, origin, damage) = {
        let spell = world
            .spells
            .get(&spell_id)
            .ok_or(CombatError::UnknownSpell)?;
        (spell.caster, spell.origin, spell.damage)
    };
    if caster == *victim {
        return Err(CombatError::SelfHit);
    }

    let (victim_pos, alive, protected) = {
        let v = world
            .combatant(victim)
            .ok_or(CombatError::UnknownCombatant)?;
        (v.position, v.alive, v.spawn_protected)
    };
    if !alive {
        return Err(CombatError::Dead);
    }
    if protected {
        // Spell is spent either way
        world.remove_spell(spell_id);
        world.push_event(GameEvent::SpellEnded { spell_id });
        return Err(CombatError::Protected);
    }

    if impact.distance(victim_pos) > config.combatant.radius + HIT_SLOP {
        return Err(CombatError::HitOutOfRange);
    }
    if geometry::segment_blocked(&world.walls, origin.x, origin.y, impact.x, impact.y).is_some() {
        // Blocked hits become wall impacts, never damage
        debug!(spell = spell_id, "rejected hit through wall");
        world.remove_spell(spell_id);
        world.push_event(GameEvent::WallImpact {
            spell_id,
            position: impact,
        });
        return Err(CombatError::LineBlocked);
    }

    world.remove_spell(spell_id);
    world.push_event(GameEvent::SpellEnded { spell_id });

    apply_hit_damage(world, config, scheduler, &caster, victim, damage, now);
    Ok(())
}

/// Validate a client-reported wall impact and retire the spell.
pub fn resolve_wall_impact(
    world: &mut World,
    spell_id: u64,
    position: Vec2,
) -> Result<(), CombatError> {
    if world.remove_spell(spell_id).is_none() {
        return Err(CombatError::UnknownSpell);
    }
    world.push_event(GameEvent::WallImpact { spell_id, position });
    Ok(())
}

/// Retire spells older than their maximum lifetime. Catches the ones a
/// disconnected or silent client never reported.
pub fn expire_spells(world: &mut World, config: &GameConfig, now: u64) {
    let max = config.spell.max_lifetime_ms;
    let expired: Vec<u64> = world
        .spells
        .values()
        .filter(|s| now.saturating_sub(s.created_at) >= max)
        .map(|s| s.id)
        .collect();
    for spell_id in expired {
        world.spells.remove(&spell_id);
        world.push_event(GameEvent::SpellEnded { spell_id });
    }
}

fn apply_hit_damage(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    attacker: &EntityId,
    victim: &EntityId,
    damage: f32,
    now: u64,
) {
    let killed = match world.combatant_mut(victim) {
        Some(v) => v.apply_damage(damage),
        None => return,
    };

    if killed {
        kill(world, config, scheduler, Some(*attacker), victim, now);
    } else {
        world.apply_burn(*victim, now, config.burn.duration_ms);
        let health = world.combatant(victim).map(|c| c.health).unwrap_or(0.0);
        world.push_event(GameEvent::HealthChanged {
            id: *victim,
            health,
            burning: true,
        });
    }
}

// =============================================================================
// BURN
// =============================================================================

/// Advance every active burn: apply due damage ticks and expire finished
/// burns. Burn deaths carry no killer credit since the effect outlives
/// its spell.
pub fn burn_tick(world: &mut World, config: &GameConfig, scheduler: &mut Scheduler, now: u64) {
    let victims: Vec<EntityId> = world.burns.keys().copied().collect();
    for victim in victims {
        let Some(burn) = world.burns.get(&victim).copied() else {
            continue;
        };
        // A tick due exactly at expiry still lands before the clear
        if now.saturating_sub(burn.last_tick_at) >= config.burn.tick_interval_ms {
            if let Some(b) = world.burns.get_mut(&victim) {
                b.last_tick_at = now;
            }
            let killed = match world.combatant_mut(&victim) {
                Some(v) if v.alive => v.apply_damage(config.burn.tick_damage),
                _ => {
                    world.clear_burn(&victim);
                    continue;
                }
            };
            if killed {
                kill(world, config, scheduler, None, &victim, now);
                continue;
            }
            let health = world.combatant(&victim).map(|c| c.health).unwrap_or(0.0);
            world.push_event(GameEvent::HealthChanged {
                id: victim,
                health,
                burning: true,
            });
        }
        if now >= burn.expires_at && world.burns.contains_key(&victim) {
            world.clear_burn(&victim);
            world.push_event(GameEvent::BurnEnded { id: victim });
        }
    }
}

// =============================================================================
// AREA BURST
// =============================================================================

/// Detonate an area burst around a combatant.
///
/// Consumes one charge and its mana cost, damages every unprotected
/// living combatant in radius (walls do not shield), and pays health and
/// mana rewards per kill.
pub fn trigger_burst(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    caster: &EntityId,
    now: u64,
) -> Result<(), CombatError> {
    let burst = &config.burst;
    let center = {
        let c = world
            .combatant(caster)
            .ok_or(CombatError::UnknownCombatant)?;
        if !c.alive {
            return Err(CombatError::Dead);
        }
        if c.burst_charges == 0 {
            return Err(CombatError::NoCharges);
        }
        if now.saturating_sub(c.last_burst_at) < burst.cooldown_ms {
            return Err(CombatError::OnCooldown);
        }
        if c.mana < burst.mana_cost {
            return Err(CombatError::InsufficientMana {
                have: c.mana,
                need: burst.mana_cost,
            });
        }
        c.position
    };

    {
        let c = world
            .combatant_mut(caster)
            .ok_or(CombatError::UnknownCombatant)?;
        c.burst_charges -= 1;
        c.mana -= burst.mana_cost;
        c.last_burst_at = now;
    }
    let (mana, charges) = world
        .combatant(caster)
        .map(|c| (c.mana, c.burst_charges))
        .unwrap_or((0.0, 0));
    world.push_event(GameEvent::ManaChanged { id: *caster, mana });
    world.push_event(GameEvent::BurstChargesChanged {
        id: *caster,
        charges,
    });

    let victims: Vec<EntityId> = world
        .combatants
        .values()
        .filter(|v| {
            v.id != *caster
                && v.alive
                && !v.spawn_protected
                && v.position.distance(center) <= burst.radius
        })
        .map(|v| v.id)
        .collect();

    world.push_event(GameEvent::AreaBurst {
        caster: *caster,
        position: center,
        radius: burst.radius,
        victims: victims.clone(),
    });

    for victim in victims {
        let killed = match world.combatant_mut(&victim) {
            Some(v) => v.apply_damage(burst.damage),
            None => continue,
        };
        if killed {
            kill(world, config, scheduler, Some(*caster), &victim, now);
            reward_burst_kill(world, config, caster);
        } else {
            let health = world.combatant(&victim).map(|c| c.health).unwrap_or(0.0);
            world.push_event(GameEvent::HealthChanged {
                id: victim,
                health,
                burning: false,
            });
        }
    }
    Ok(())
}

fn reward_burst_kill(world: &mut World, config: &GameConfig, caster: &EntityId) {
    let max_health = config.combatant.max_health;
    let max_mana = config.combatant.max_mana;
    let Some(c) = world.combatant_mut(caster) else {
        return;
    };
    c.health = (c.health + config.burst.kill_health_reward).min(max_health);
    c.mana = (c.mana + config.burst.kill_mana_reward).min(max_mana);
    let (health, mana) = (c.health, c.mana);
    world.push_event(GameEvent::HealthChanged {
        id: *caster,
        health,
        burning: false,
    });
    world.push_event(GameEvent::ManaChanged { id: *caster, mana });
}

// =============================================================================
// DEATH AND RESPAWN
// =============================================================================

/// Kill a combatant: mark dead, end its burn, credit the killer, notify,
/// and schedule the respawn chain.
pub fn kill(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    killer: Option<EntityId>,
    victim: &EntityId,
    now: u64,
) {
    if let Some(v) = world.combatant_mut(victim) {
        v.alive = false;
        v.health = 0.0;
        v.velocity = Vec2::ZERO;
    }
    let was_burning = world.burns.remove(victim).is_some();
    if let Some(v) = world.combatant_mut(victim) {
        v.burning = false;
    }
    if was_burning {
        world.push_event(GameEvent::BurnEnded { id: *victim });
    }

    let killer_kills = match killer.as_ref().and_then(|k| world.combatant_mut(k)) {
        Some(k) => {
            k.kills += 1;
            k.kills
        }
        None => 0,
    };

    world.push_event(GameEvent::CombatantKilled {
        killer,
        victim: *victim,
        killer_kills,
    });
    world.push_event(GameEvent::DeathNotice {
        victim: *victim,
        respawn_in_ms: config.respawn.delay_ms,
    });

    scheduler.schedule(*victim, TaskKind::Respawn, now + config.respawn.delay_ms);
    debug!(victim = %victim.short(), "combatant killed");
}

/// Bring a dead combatant back at a fresh safe position with full
/// resources, a reset kill streak, and timed protection windows.
pub fn respawn(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    id: &EntityId,
    now: u64,
) {
    let position = generator::safe_spawn_position(
        &world.walls,
        config.world.width,
        config.world.height,
        config.combatant.radius,
        config.combatant.spawn_margin,
        &mut world.rng,
    );

    let Some(c) = world.combatant_mut(id) else {
        return;
    };
    c.alive = true;
    c.position = position;
    c.velocity = Vec2::ZERO;
    c.health = config.combatant.max_health;
    c.mana = config.combatant.max_mana;
    c.kills = 0;
    c.speed_buffs.clear();
    c.burning = false;
    c.spawn_protected = true;
    c.movement_immune = true;
    c.first_spawn = false;
    let snapshot = c.clone();

    world.push_event(GameEvent::CombatantRespawned {
        combatant: snapshot,
    });

    scheduler.schedule(
        *id,
        TaskKind::MovementImmunityEnd,
        now + config.respawn.movement_immunity_ms,
    );
    scheduler.schedule(
        *id,
        TaskKind::SpawnProtectionEnd,
        now + config.respawn.protection_ms,
    );
}

/// Execute one fired scheduler task.
pub fn fire_task(
    world: &mut World,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    entity: EntityId,
    kind: TaskKind,
    now: u64,
) {
    match kind {
        TaskKind::Respawn => respawn(world, config, scheduler, &entity, now),
        TaskKind::SpawnProtectionEnd => {
            if let Some(c) = world.combatant_mut(&entity) {
                c.spawn_protected = false;
                world.push_event(GameEvent::SpawnProtectionEnded { id: entity });
            }
        }
        TaskKind::MovementImmunityEnd => {
            if let Some(c) = world.combatant_mut(&entity) {
                c.movement_immune = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Lcg;
    use crate::game::state::Combatant;
    use crate::world::geometry::{Rect, Wall, WallKind};

    fn arena() -> (World, GameConfig, Scheduler) {
        let config = GameConfig::default();
        let world = World::new(Vec::new(), Lcg::new(11));
        (world, config, Scheduler::new())
    }

    fn add_fighter(world: &mut World, config: &GameConfig, b: u8, pos: Vec2) -> EntityId {
        let id = EntityId::new([b; 16]);
        let mut c = Combatant::new(id, format!("fighter-{b}"), b, pos, config);
        c.spawn_protected = false;
        c.movement_immune = false;
        world.add_combatant(c);
        id
    }

    #[test]
    fn test_cast_deducts_mana_and_registers_spell() {
        let (mut world, config, _) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));

        let spell_id = cast_spell(&mut world, &config, &caster, Vec2::new(400.0, 100.0), 0)
            .unwrap();

        let c = world.combatant(&caster).unwrap();
        assert_eq!(c.mana, config.combatant.max_mana - config.spell.mana_cost);
        assert!(world.spells.contains_key(&spell_id));
        // Recoil pushes opposite the cast direction
        assert!(c.velocity.x < 0.0);
    }

    #[test]
    fn test_cast_without_mana_rejected() {
        let (mut world, config, _) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));
        world.combatant_mut(&caster).unwrap().mana = 1.0;

        let err = cast_spell(&mut world, &config, &caster, Vec2::new(400.0, 100.0), 0);
        assert!(matches!(err, Err(CombatError::InsufficientMana { .. })));
        assert!(world.spells.is_empty());
    }

    #[test]
    fn test_kite_boost_when_retreating() {
        let (mut world, config, _) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));
        // Moving left while casting right
        world.combatant_mut(&caster).unwrap().velocity = Vec2::new(-200.0, 0.0);

        cast_spell(&mut world, &config, &caster, Vec2::new(400.0, 100.0), 1000).unwrap();

        assert!(world.combatant(&caster).unwrap().is_boosted(1500));
    }

    #[test]
    fn test_hit_applies_damage_and_burn() {
        let (mut world, config, mut sched) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(300.0, 100.0));

        let spell_id =
            cast_spell(&mut world, &config, &caster, Vec2::new(300.0, 100.0), 0).unwrap();
        resolve_hit(&mut world, &config, &mut sched, spell_id, &victim, Vec2::new(300.0, 100.0), 200)
            .unwrap();

        let v = world.combatant(&victim).unwrap();
        assert_eq!(v.health, config.combatant.max_health - config.spell.damage);
        assert!(v.burning);
        assert!(world.burns.contains_key(&victim));
        assert!(world.spells.is_empty());
    }

    #[test]
    fn test_hit_through_wall_rejected() {
        let (mut world, config, mut sched) = arena();
        world
            .walls
            .push(Wall::solid(0, WallKind::Straight, Rect::new(190.0, 50.0, 14.0, 120.0)));
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(300.0, 100.0));

        let spell_id =
            cast_spell(&mut world, &config, &caster, Vec2::new(300.0, 100.0), 0).unwrap();
        let err = resolve_hit(
            &mut world,
            &config,
            &mut sched,
            spell_id,
            &victim,
            Vec2::new(300.0, 100.0),
            200,
        );

        assert_eq!(err, Err(CombatError::LineBlocked));
        assert_eq!(
            world.combatant(&victim).unwrap().health,
            config.combatant.max_health
        );
        // The spell dies on the wall and the impact is announced
        assert!(world.spells.is_empty());
        let events = world.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::WallImpact { .. })));
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::HealthChanged { .. })));
    }

    #[test]
    fn test_hit_far_from_victim_rejected() {
        let (mut world, config, mut sched) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(300.0, 100.0));

        let spell_id =
            cast_spell(&mut world, &config, &caster, Vec2::new(300.0, 100.0), 0).unwrap();
        let err = resolve_hit(
            &mut world,
            &config,
            &mut sched,
            spell_id,
            &victim,
            Vec2::new(600.0, 100.0),
            200,
        );
        assert_eq!(err, Err(CombatError::HitOutOfRange));
    }

    #[test]
    fn test_protected_victim_takes_no_damage() {
        let (mut world, config, mut sched) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(300.0, 100.0));
        world.combatant_mut(&victim).unwrap().spawn_protected = true;

        let spell_id =
            cast_spell(&mut world, &config, &caster, Vec2::new(300.0, 100.0), 0).unwrap();
        let err = resolve_hit(
            &mut world,
            &config,
            &mut sched,
            spell_id,
            &victim,
            Vec2::new(300.0, 100.0),
            200,
        );

        assert_eq!(err, Err(CombatError::Protected));
        // Spell is spent even on a protected target
        assert!(world.spells.is_empty());
    }

    #[test]
    fn test_burn_ticks_then_expires() {
        let (mut world, config, mut sched) = arena();
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(300.0, 100.0));
        world.apply_burn(victim, 0, config.burn.duration_ms);

        burn_tick(&mut world, &config, &mut sched, config.burn.tick_interval_ms);
        let h1 = world.combatant(&victim).unwrap().health;
        assert_eq!(h1, config.combatant.max_health - config.burn.tick_damage);

        // Too soon for a second tick
        burn_tick(
            &mut world,
            &config,
            &mut sched,
            config.burn.tick_interval_ms + 10,
        );
        assert_eq!(world.combatant(&victim).unwrap().health, h1);

        // Past expiry the burn clears
        burn_tick(&mut world, &config, &mut sched, config.burn.duration_ms + 1);
        assert!(!world.burns.contains_key(&victim));
        assert!(!world.combatant(&victim).unwrap().burning);
    }

    #[test]
    fn test_burn_full_duration_totals_ten_ticks() {
        let (mut world, config, mut sched) = arena();
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(300.0, 100.0));
        world.apply_burn(victim, 0, config.burn.duration_ms);

        // One pass per interval, the last one landing exactly at expiry
        let mut t = config.burn.tick_interval_ms;
        while t <= config.burn.duration_ms {
            burn_tick(&mut world, &config, &mut sched, t);
            t += config.burn.tick_interval_ms;
        }

        // 10 ticks of 2 over a 10s burn
        assert_eq!(world.combatant(&victim).unwrap().health, 80.0);
        assert!(!world.burns.contains_key(&victim));
        assert!(!world.combatant(&victim).unwrap().burning);
    }

    #[test]
    fn test_burn_can_kill_without_credit() {
        let (mut world, config, mut sched) = arena();
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(300.0, 100.0));
        world.combatant_mut(&victim).unwrap().health = 1.0;
        world.apply_burn(victim, 0, config.burn.duration_ms);

        burn_tick(&mut world, &config, &mut sched, config.burn.tick_interval_ms);

        let v = world.combatant(&victim).unwrap();
        assert!(!v.alive);
        let events = world.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::CombatantKilled { killer: None, .. }
        )));
    }

    #[test]
    fn test_kill_and_respawn_cycle() {
        let (mut world, config, mut sched) = arena();
        let killer = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(300.0, 100.0));
        world.combatant_mut(&victim).unwrap().health = 5.0;
        world.combatant_mut(&victim).unwrap().kills = 7;

        let spell_id =
            cast_spell(&mut world, &config, &killer, Vec2::new(300.0, 100.0), 0).unwrap();
        resolve_hit(&mut world, &config, &mut sched, spell_id, &victim, Vec2::new(300.0, 100.0), 100)
            .unwrap();

        assert!(!world.combatant(&victim).unwrap().alive);
        assert_eq!(world.combatant(&killer).unwrap().kills, 1);

        // Respawn fires after the delay
        let fired = sched.drain_due(100 + config.respawn.delay_ms);
        assert_eq!(fired, vec![(victim, TaskKind::Respawn)]);
        for (entity, kind) in fired {
            fire_task(&mut world, &config, &mut sched, entity, kind, 3100);
        }

        let v = world.combatant(&victim).unwrap();
        assert!(v.alive);
        assert_eq!(v.health, config.combatant.max_health);
        assert_eq!(v.kills, 0);
        assert!(v.spawn_protected);
        assert!(v.movement_immune);
        // Both expirations are queued
        assert_eq!(sched.len(), 2);
    }

    #[test]
    fn test_protection_windows_expire_in_order() {
        let (mut world, config, mut sched) = arena();
        let id = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));
        kill(&mut world, &config, &mut sched, None, &id, 0);
        let due = sched.drain_due(config.respawn.delay_ms);
        assert_eq!(due, vec![(id, TaskKind::Respawn)]);
        for (e, k) in due {
            fire_task(&mut world, &config, &mut sched, e, k, 3000);
        }

        // Movement immunity ends before spawn protection
        let first = sched.drain_due(3000 + config.respawn.movement_immunity_ms);
        assert_eq!(first, vec![(id, TaskKind::MovementImmunityEnd)]);
        for (e, k) in first {
            fire_task(&mut world, &config, &mut sched, e, k, 4000);
        }
        let c = world.combatant(&id).unwrap();
        assert!(!c.movement_immune);
        assert!(c.spawn_protected);

        let second = sched.drain_due(3000 + config.respawn.protection_ms);
        assert_eq!(second, vec![(id, TaskKind::SpawnProtectionEnd)]);
        for (e, k) in second {
            fire_task(&mut world, &config, &mut sched, e, k, 6000);
        }
        assert!(!world.combatant(&id).unwrap().spawn_protected);
    }

    #[test]
    fn test_burst_damages_all_in_radius() {
        let (mut world, config, mut sched) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(500.0, 500.0));
        let near = add_fighter(&mut world, &config, 2, Vec2::new(560.0, 500.0));
        let far = add_fighter(&mut world, &config, 3, Vec2::new(900.0, 900.0));
        {
            let c = world.combatant_mut(&caster).unwrap();
            c.burst_charges = 1;
        }

        trigger_burst(&mut world, &config, &mut sched, &caster, 5000).unwrap();

        assert_eq!(
            world.combatant(&near).unwrap().health,
            config.combatant.max_health - config.burst.damage
        );
        assert_eq!(
            world.combatant(&far).unwrap().health,
            config.combatant.max_health
        );
        let c = world.combatant(&caster).unwrap();
        assert_eq!(c.burst_charges, 0);
        assert_eq!(c.mana, config.combatant.max_mana - config.burst.mana_cost);
    }

    #[test]
    fn test_burst_kill_pays_rewards() {
        let (mut world, config, mut sched) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(500.0, 500.0));
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(560.0, 500.0));
        {
            let c = world.combatant_mut(&caster).unwrap();
            c.burst_charges = 1;
            c.health = 50.0;
        }
        world.combatant_mut(&victim).unwrap().health = 10.0;

        trigger_burst(&mut world, &config, &mut sched, &caster, 5000).unwrap();

        let c = world.combatant(&caster).unwrap();
        assert!(!world.combatant(&victim).unwrap().alive);
        assert_eq!(c.kills, 1);
        assert_eq!(c.health, 50.0 + config.burst.kill_health_reward);
    }

    #[test]
    fn test_burst_cooldown_enforced() {
        let (mut world, config, mut sched) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(500.0, 500.0));
        world.combatant_mut(&caster).unwrap().burst_charges = 2;

        trigger_burst(&mut world, &config, &mut sched, &caster, 5000).unwrap();
        let err = trigger_burst(&mut world, &config, &mut sched, &caster, 5100);
        assert_eq!(err, Err(CombatError::OnCooldown));

        trigger_burst(
            &mut world,
            &config,
            &mut sched,
            &caster,
            5000 + config.burst.cooldown_ms,
        )
        .unwrap();
    }

    #[test]
    fn test_spell_lifetime_expiry() {
        let (mut world, config, _) = arena();
        let caster = add_fighter(&mut world, &config, 1, Vec2::new(100.0, 100.0));
        cast_spell(&mut world, &config, &caster, Vec2::new(400.0, 100.0), 0).unwrap();

        expire_spells(&mut world, &config, config.spell.max_lifetime_ms - 1);
        assert_eq!(world.spells.len(), 1);
        expire_spells(&mut world, &config, config.spell.max_lifetime_ms);
        assert!(world.spells.is_empty());
    }

    #[test]
    fn test_death_ends_burn() {
        let (mut world, config, mut sched) = arena();
        let victim = add_fighter(&mut world, &config, 2, Vec2::new(300.0, 100.0));
        world.apply_burn(victim, 0, config.burn.duration_ms);

        kill(&mut world, &config, &mut sched, None, &victim, 500);

        assert!(!world.burns.contains_key(&victim));
        let events = world.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::BurnEnded { .. })));
    }
}
