//! Fixed-cadence send scheduling
//!
//! The host ticks at whatever rate it renders; local snapshots go out at a
//! steady [`UPDATE_INTERVAL`]. Elapsed time accumulates between ticks and one
//! interval is spent per send, so the remainder carries over and the long-run
//! rate does not drift. At most one send happens per tick.

use ghostsync_core::time::update_number_from_elapsed;
use ghostsync_core::{UpdateNumber, UPDATE_INTERVAL};
use std::time::{Duration, Instant};

/// Leaky accumulator deciding when the local snapshot is sent
#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    /// Time between sends
    interval: Duration,
    /// Elapsed time not yet spent on a send
    accumulated: Duration,
    /// Time of the first send; update numbers count milliseconds from here
    start: Option<Instant>,
    /// Time of the previous tick
    last_tick: Option<Instant>,
    /// Whether a send slot was already claimed since the last advance
    sent_this_tick: bool,
}

impl UpdateScheduler {
    /// Create a scheduler with a custom interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
            start: None,
            last_tick: None,
            sent_this_tick: false,
        }
    }

    /// Accumulate the time elapsed since the previous tick
    ///
    /// Does nothing until the first send has started the clock.
    pub fn advance(&mut self, now: Instant) {
        self.sent_this_tick = false;
        if let Some(last) = self.last_tick {
            self.accumulated += now.saturating_duration_since(last);
            self.last_tick = Some(now);
        }
    }

    /// Claim a send slot, returning the update number to stamp on it
    ///
    /// The first call after a reset always succeeds with update number 0 and
    /// starts the clock. Later calls succeed once a full interval has
    /// accumulated and spend exactly one interval. At most one slot is
    /// granted between two calls to [`advance`].
    ///
    /// [`advance`]: UpdateScheduler::advance
    pub fn try_send(&mut self, now: Instant) -> Option<UpdateNumber> {
        if self.sent_this_tick {
            return None;
        }
        let Some(start) = self.start else {
            self.start = Some(now);
            self.last_tick = Some(now);
            self.accumulated = Duration::ZERO;
            self.sent_this_tick = true;
            return Some(0);
        };
        if self.accumulated < self.interval {
            return None;
        }
        self.accumulated -= self.interval;
        self.sent_this_tick = true;
        Some(update_number_from_elapsed(now.saturating_duration_since(start)))
    }

    /// Local update number at `now`, once the clock has started
    pub fn update_number(&self, now: Instant) -> Option<UpdateNumber> {
        self.start
            .map(|start| update_number_from_elapsed(now.saturating_duration_since(start)))
    }

    /// Whether the first send has happened
    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    /// Time accumulated toward the next send
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Get the send interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Forget the clock and any accumulated time
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.start = None;
        self.last_tick = None;
        self.sent_this_tick = false;
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(UPDATE_INTERVAL)
    }
}
