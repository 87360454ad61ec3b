//! Deferred one-shot actions keyed to clock time
//!
//! Used for banner timeouts and the game-over reset delay. Nothing here
//! sleeps: the tick loop drains whatever has come due.

use super::state::Banner;

/// Handle for cancelling a scheduled action
pub type TimerId = u64;

/// Actions that can be deferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Take a banner down
    ClearBanner(Banner),
    /// Leave GameOver and reinitialize the game
    BeginReset,
}

#[derive(Debug, Clone)]
struct Deferred {
    id: TimerId,
    due_ms: u64,
    action: DeferredAction,
}

/// Pending deferred actions
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pending: Vec<Deferred>,
    next_id: TimerId,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once `delay_ms` has passed since `now_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, action: DeferredAction) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        self.pending.push(Deferred {
            id,
            due_ms: now_ms.saturating_add(delay_ms),
            action,
        });
        id
    }

    /// Drop a pending action; returns false if it already ran or never existed
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|d| d.id != id);
        self.pending.len() != before
    }

    /// Drop every pending action matching `pred`
    pub fn cancel_where(&mut self, pred: impl Fn(&DeferredAction) -> bool) {
        self.pending.retain(|d| !pred(&d.action));
    }

    /// Remove and return every action due at `now_ms`, earliest first
    /// (ties in scheduling order)
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<DeferredAction> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|d| d.due_ms <= now_ms);
        self.pending = pending;
        due.sort_by_key(|d| (d.due_ms, d.id));
        due.into_iter().map(|d| d.action).collect()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
