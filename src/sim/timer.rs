//! Millisecond scheduler for recurring and one-shot callbacks
//!
//! Timers may be owned by an entity. Destroying the entity cancels every timer
//! it owns, so callbacks never fire for a body that is already gone.

use serde::{Deserialize, Serialize};

use super::state::EntityId;

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Drop a new pedestrian onto the track
    SpawnPedestrian,
    /// Police unit fires at the player
    PoliceFire(EntityId),
    /// Bullet ran out of time to live
    Expire(EntityId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    /// Registration order, breaks ties between timers due together
    seq: u32,
    owner: Option<EntityId>,
    action: TimerAction,
    due_ms: u64,
    /// `Some` for recurring timers
    period_ms: Option<u64>,
}

/// Timer queue driven by the simulation clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    timers: Vec<Timer>,
    now_ms: u64,
    next_seq: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Pending timers owned by `owner`
    pub fn owned_by(&self, owner: EntityId) -> usize {
        self.timers.iter().filter(|t| t.owner == Some(owner)).count()
    }

    /// Fire `action` every `period_ms`, first time one period from now
    pub fn every(&mut self, period_ms: u64, owner: Option<EntityId>, action: TimerAction) {
        // A zero period would fire forever within one frame
        let period_ms = period_ms.max(1);
        self.push(period_ms, Some(period_ms), owner, action);
    }

    /// Fire `action` once after `delay_ms`
    pub fn after(&mut self, delay_ms: u64, owner: Option<EntityId>, action: TimerAction) {
        self.push(delay_ms, None, owner, action);
    }

    fn push(
        &mut self,
        delay_ms: u64,
        period_ms: Option<u64>,
        owner: Option<EntityId>,
        action: TimerAction,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            seq,
            owner,
            action,
            due_ms: self.now_ms + delay_ms,
            period_ms,
        });
    }

    /// Cancel every timer owned by `owner`, returning how many were removed
    pub fn cancel_owned_by(&mut self, owner: EntityId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.owner != Some(owner));
        before - self.timers.len()
    }

    /// Take the earliest timer due at or before `until_ms`.
    ///
    /// Moves the clock to that timer's due time so callbacks that schedule new
    /// timers measure from the moment they fired. Ties fire in registration
    /// order. Recurring timers are re-armed one period after their previous
    /// due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerAction> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.seq))
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[idx];
        let action = timer.action;
        self.now_ms = self.now_ms.max(timer.due_ms);

        match timer.period_ms {
            Some(period) => timer.due_ms += period,
            None => {
                self.timers.remove(idx);
            }
        }

        Some(action)
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
