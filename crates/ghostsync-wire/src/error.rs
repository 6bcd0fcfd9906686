//! Error types for ghostsync-wire

use thiserror::Error;

/// Framing error for snapshot datagrams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    /// Datagram length is zero, not a multiple of the record size, or too long
    #[error("Invalid datagram length {0}: expected a positive multiple of {record} up to {max}", record = crate::RECORD_LEN, max = crate::MAX_DATAGRAM_LEN)]
    InvalidLength(usize),

    /// Attempted to encode a datagram with no records
    #[error("Cannot encode an empty datagram")]
    Empty,

    /// Attempted to encode more records than fit in one datagram
    #[error("Cannot encode {0} records in one datagram, limit is {max}", max = crate::MAX_RECORDS_PER_DATAGRAM)]
    TooManyRecords(usize),
}

/// Result type for wire operations
pub type Result<T> = std::result::Result<T, WireError>;
