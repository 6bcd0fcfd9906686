//! Zone identity hashing
//!
//! A zone is the hash of a scene name. Two participants are co-located when
//! their zone hashes match; the hash is never reversed.
//!
//! The hash is 32-bit FNV-1a over the name's UTF-16 code units, feeding the
//! high byte of each unit before the low byte. Peers compute the same value
//! independently, so the constants below are part of the wire contract.

use serde::{Deserialize, Serialize};
use std::fmt;

const FNV_OFFSET_BASIS: u32 = 0x911c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Hashed scene identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zone(pub u32);

impl Zone {
    /// Hash a scene name into a zone
    ///
    /// # Example
    ///
    /// ```
    /// use ghostsync_core::Zone;
    ///
    /// let a = Zone::from_name("Zone_Library");
    /// let b = Zone::from_name("Zone_Library");
    /// assert_eq!(a, b);
    /// assert_ne!(a, Zone::from_name("Zone_Tower"));
    /// ```
    pub fn from_name(name: &str) -> Self {
        let mut hash = FNV_OFFSET_BASIS;
        for unit in name.encode_utf16() {
            for byte in unit.to_be_bytes() {
                hash ^= u32::from(byte);
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        }
        Self(hash)
    }

    /// Create a zone from a raw hash received off the wire
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw hash value
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone:{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Straight-line reference: FNV-1a over the big-endian UTF-16 byte stream
    fn reference_hash(name: &str) -> u32 {
        let bytes: Vec<u8> = name.encode_utf16().flat_map(u16::to_be_bytes).collect();
        bytes.iter().fold(FNV_OFFSET_BASIS, |h, b| {
            (h ^ u32::from(*b)).wrapping_mul(FNV_PRIME)
        })
    }

    #[test]
    fn test_empty_name_is_offset_basis() {
        assert_eq!(Zone::from_name("").raw(), 0x911c_9dc5);
    }

    #[test]
    fn test_single_ascii_char() {
        // 'A' is 0x0041: the zero high byte is hashed first
        let mut expected = FNV_OFFSET_BASIS;
        expected = (expected ^ 0x00).wrapping_mul(FNV_PRIME);
        expected = (expected ^ 0x41).wrapping_mul(FNV_PRIME);
        assert_eq!(Zone::from_name("A").raw(), expected);
    }

    #[test]
    fn test_matches_reference() {
        for name in ["TitleScreen", "Zone_Upper", "Zone_Library", "ünïcode", "城"] {
            assert_eq!(Zone::from_name(name).raw(), reference_hash(name));
        }
    }

    #[test]
    fn test_byte_order_matters() {
        // U+4100 and U+0041 differ only in which byte is high
        assert_ne!(Zone::from_name("\u{4100}"), Zone::from_name("\u{0041}"));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Zone::new(0xab)), "zone:000000ab");
    }
}
