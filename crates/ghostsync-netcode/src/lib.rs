//! Ghostsync Netcode - Client session for ghost synchronization
//!
//! This crate ties the wire codec and the per-peer history together into the
//! client-side session a game host embeds:
//!
//! - **Control protocol**: JSON messages over a reliable channel assign the
//!   local id and maintain the roster
//! - **Data channel**: fixed 24-byte snapshot records over an unreliable
//!   channel
//! - **Send scheduling**: local snapshots leave at a steady 60 Hz whatever
//!   the host's frame rate
//! - **Ghost registry**: which remote participants to render and which to
//!   remove
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          Client                               │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐   │
//! │  │ on_scene_load│─▶│ connect /    │─▶│  ControlChannel    │   │
//! │  └──────────────┘  │ disconnect   │  │  (JSON, reliable)  │   │
//! │                    └──────────────┘  └────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐   │
//! │  │set_player_   │─▶│  Update      │─▶│  DataChannel       │   │
//! │  │info          │  │  Scheduler   │  │  (24-byte records) │   │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘   │
//! │                                               │               │
//! │  ┌──────────────┐  ┌──────────────┐           ▼               │
//! │  │ ghost_info   │◀─│GhostRegistry │◀── decode_datagram        │
//! │  └──────────────┘  └──────────────┘                           │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ghostsync_core::PlayerSnapshot;
//! use ghostsync_netcode::Client;
//!
//! let mut client = Client::new(connector);
//! client.on_scene_load("Zone_Library");
//!
//! // Host frame loop
//! loop {
//!     client.set_player_info(PlayerSnapshot::new(location, rotation));
//!     client.tick();
//!
//!     let update = client.ghost_info();
//!     for snapshot in &update.updates {
//!         render_ghost(snapshot);
//!     }
//!     for id in &update.removals {
//!         despawn_ghost(*id);
//!     }
//! }
//! ```

mod config;
mod control;
mod error;
mod ghost;
mod scheduler;
mod session;
mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::ClientConfig;
pub use control::{ClientMessage, MessageKind, ProtocolError, ServerMessage};
pub use error::{Error, Result};
pub use ghost::{GhostRegistry, GhostUpdate};
pub use scheduler::UpdateScheduler;
pub use session::{Client, ConnectionState, NON_INTERACTIVE_SCENES};
pub use transport::{Connector, ControlChannel, ControlEvent, DataChannel};

// Re-export shared types for convenience
pub use ghostsync_core::{PeerId, PlayerSnapshot, Zone};
