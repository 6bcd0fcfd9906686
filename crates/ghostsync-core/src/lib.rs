//! Ghostsync Core - Value types shared by every ghostsync crate
//!
//! This crate provides the plain data model for pose synchronization:
//! - `PlayerSnapshot` - a participant's location and rotation at one instant
//! - `Zone` - hashed scene identity used to decide co-location
//! - `PeerId` - one-byte session-scoped participant identifier
//! - `UpdateNumber` and the fixed update cadence
//!
//! Nothing in here does I/O or keeps mutable state; the stateful parts live
//! in `ghostsync-history` and `ghostsync-netcode`.

mod error;
mod identity;
mod snapshot;
pub mod time;
mod zone;

pub use error::{Error, Result};
pub use identity::{PeerId, MAX_PEERS};
pub use snapshot::{normalize_angle, PlayerSnapshot};
pub use time::{UpdateNumber, PLAYBACK_DELAY, UPDATES_PER_SECOND, UPDATE_INTERVAL};
pub use zone::Zone;
