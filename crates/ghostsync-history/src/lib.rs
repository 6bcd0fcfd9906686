//! Ghostsync History - Per-peer snapshot history for smooth playback
//!
//! Remote snapshots arrive late, out of order, or not at all. This crate keeps
//! a short ordered window of each remote participant's snapshots and picks the
//! one to render so that playback runs a fixed delay behind the estimated
//! remote clock.
//!
//! # Features
//!
//! - **Bounded memory**: at most [`HISTORY_CAPACITY`] states and
//!   [`OFFSET_WINDOW_CAPACITY`] offset samples per peer
//! - **Stale rejection**: duplicates and states older than the retained window
//!   are dropped
//! - **Clock offset estimation**: rolling average of remote minus local update
//!   numbers
//! - **Nearest-match playback**: the rendered state is the retained state
//!   closest to the playback target, never a blend of two
//!
//! # Example
//!
//! ```rust
//! use ghostsync_core::{PeerId, PlayerSnapshot, Zone};
//! use ghostsync_history::{Ghost, State};
//!
//! let zone = Zone::from_name("Zone_Library");
//! let mut ghost = Ghost::new(PeerId(4));
//!
//! // Remote clock runs 500 ahead of ours
//! for (remote, local) in [(600, 100), (650, 150), (700, 200)] {
//!     let state = State::new(remote, zone, PlayerSnapshot::default());
//!     assert!(ghost.receive(state, local));
//! }
//!
//! // Target = 200 + 500 - 100 = 600
//! let current = ghost.refresh_state(200).unwrap();
//! assert_eq!(current.update_number, 600);
//! assert_eq!(current.snapshot.id(), PeerId(4));
//! ```

mod ghost;
mod history;
mod offset;

pub use ghost::Ghost;
pub use history::{State, StateHistory, HISTORY_CAPACITY};
pub use offset::{OffsetWindow, OFFSET_WINDOW_CAPACITY};
