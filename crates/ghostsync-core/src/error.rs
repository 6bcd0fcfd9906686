//! Error types for ghostsync-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Peer id out of range: {0} does not fit in one byte")]
    PeerIdOutOfRange(u64),

    #[error("Non-finite {field} value: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
