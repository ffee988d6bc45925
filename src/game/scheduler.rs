//! Deferred Task Scheduler
//!
//! Timed per-entity work (respawns, protection expiry) keyed so that
//! removing an entity cancels everything it still had pending. Firing
//! order is deterministic: due time first, then entity, then kind.

use std::collections::BTreeMap;

use crate::game::state::EntityId;

/// The closed set of deferrable tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskKind {
    /// Bring a dead combatant back
    Respawn,
    /// Drop damage immunity after respawn
    SpawnProtectionEnd,
    /// Drop movement-validation immunity after respawn
    MovementImmunityEnd,
}

/// Cancellable timer set. Scheduling the same (entity, kind) pair again
/// replaces the previous due time.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: BTreeMap<(EntityId, TaskKind), u64>,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule (or reschedule) a task.
    pub fn schedule(&mut self, entity: EntityId, kind: TaskKind, due_at: u64) {
        self.tasks.insert((entity, kind), due_at);
    }

    /// Cancel one pending task. No-op if absent.
    pub fn cancel(&mut self, entity: EntityId, kind: TaskKind) {
        self.tasks.remove(&(entity, kind));
    }

    /// Cancel every task for an entity. Called on disconnect/removal so
    /// a fired timer can never reference a missing entity.
    pub fn cancel_all(&mut self, entity: &EntityId) {
        self.tasks.retain(|(e, _), _| e != entity);
    }

    /// Remove and return all tasks due at or before `now`, in firing order.
    pub fn drain_due(&mut self, now: u64) -> Vec<(EntityId, TaskKind)> {
        let mut due: Vec<((EntityId, TaskKind), u64)> = self
            .tasks
            .iter()
            .filter(|(_, &at)| at <= now)
            .map(|(&key, &at)| (key, at))
            .collect();
        due.sort_by_key(|&(key, at)| (at, key));
        for (key, _) in &due {
            self.tasks.remove(key);
        }
        due.into_iter().map(|(key, _)| key).collect()
    }

    /// Earliest pending due time, if any. Lets the driver sleep precisely.
    pub fn next_due(&self) -> Option<u64> {
        self.tasks.values().copied().min()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
