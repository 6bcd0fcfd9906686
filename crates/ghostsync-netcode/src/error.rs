//! Error types for ghostsync-netcode

use crate::control::ProtocolError;
use ghostsync_wire::WireError;
use thiserror::Error;

/// Netcode error type
#[derive(Debug, Error)]
pub enum Error {
    /// Channel open, send or receive failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Control message failed validation
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Datagram failed framing checks
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    /// Outbound message could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// Configuration could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for netcode operations
pub type Result<T> = std::result::Result<T, Error>;
