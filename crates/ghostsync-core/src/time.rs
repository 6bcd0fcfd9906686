//! Update numbering and cadence
//!
//! Every snapshot carries an update number: the sender's elapsed milliseconds
//! since its first send in the current session. Update numbers order a
//! peer's snapshots and estimate the clock offset between peers.

use std::time::Duration;

/// Per-session update counter carried on the wire
pub type UpdateNumber = u32;

/// Local snapshots sent per second
pub const UPDATES_PER_SECOND: u32 = 60;

/// Fixed interval between local sends
pub const UPDATE_INTERVAL: Duration =
    Duration::from_nanos(1_000_000_000 / UPDATES_PER_SECOND as u64);

/// Buffering delay in update-number units applied when choosing which
/// remote state to render
pub const PLAYBACK_DELAY: i64 = 100;

/// Convert an elapsed duration to an update number, saturating at the
/// largest representable value
pub fn update_number_from_elapsed(elapsed: Duration) -> UpdateNumber {
    UpdateNumber::try_from(elapsed.as_millis()).unwrap_or(UpdateNumber::MAX)
}
