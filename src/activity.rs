//! Activity debounce state machine.
//!
//! Two states, `Active` and `Inactive`:
//! - A qualifying input always lands in `Active` and re-arms the timer
//! - Timer expiry moves `Active` to `Inactive` and leaves no timer pending
//!
//! The machine holds no clock; callers pass event instants in and report
//! expiry when the deadline passes.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::domain::Activity;

/// State record for one monitor.
#[derive(Debug)]
pub struct ActivityState {
    is_active: bool,

    /// Deadline of the pending timer. At most one exists.
    pending_timer: Option<Instant>,
}

impl ActivityState {
    /// Create the initial state: active, no timer pending.
    pub fn new() -> Self {
        Self {
            is_active: true,
            pending_timer: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn activity(&self) -> Activity {
        Activity::from_active(self.is_active)
    }

    /// Deadline of the pending timer, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_timer
    }

    /// Handle a qualifying input that happened at `at`.
    ///
    /// Cancels any pending timer and arms a new one for `timeout` after `at`.
    /// Returns the new activity if the state changed.
    pub fn record_input(&mut self, at: Instant, timeout: Duration) -> Option<Activity> {
        let was_active = self.is_active;
        self.is_active = true;

        if let Some(previous) = self.pending_timer.take() {
            trace!("Cancelled timer due at {:?}", previous);
        }
        self.pending_timer = Some(at + timeout);

        if was_active {
            None
        } else {
            Some(Activity::Active)
        }
    }

    /// Handle expiry of the pending timer.
    ///
    /// Returns `Some(Inactive)` on the `Active -> Inactive` edge. Without a
    /// pending timer nothing changes.
    pub fn expire(&mut self) -> Option<Activity> {
        self.pending_timer.take()?;

        let was_active = self.is_active;
        self.is_active = false;

        if was_active {
            Some(Activity::Inactive)
        } else {
            None
        }
    }

    /// Expire the timer if its deadline is at or before `now`.
    pub fn poll_expired(&mut self, now: Instant) -> Option<Activity> {
        match self.pending_timer {
            Some(deadline) if deadline <= now => self.expire(),
            _ => None,
        }
    }

    /// Drop the pending timer without changing state.
    pub fn cancel(&mut self) {
        self.pending_timer = None;
    }
}

impl Default for ActivityState {
    fn default() -> Self {
        Self::new()
    }
}
