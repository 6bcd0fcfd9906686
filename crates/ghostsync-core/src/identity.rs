//! Identity types for session participants

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard ceiling on simultaneous participants.
///
/// Peer identifiers are a single byte on the wire, so a session can never
/// address more than this many participants.
pub const MAX_PEERS: usize = u8::MAX as usize + 1;

/// One-byte identifier of a participant, assigned by the server
///
/// Stable for the lifetime of the participant's membership in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub u8);

impl PeerId {
    /// Create a new peer ID
    pub fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer:{}", self.0)
    }
}

impl From<u8> for PeerId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

impl TryFrom<u64> for PeerId {
    type Error = crate::Error;

    fn try_from(value: u64) -> crate::Result<Self> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| crate::Error::PeerIdOutOfRange(value))
    }
}
