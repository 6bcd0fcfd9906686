//! Ghostsync Wire - Binary snapshot codec
//!
//! Snapshots travel over the unreliable data channel as fixed-width 24-byte
//! records. A datagram is 1 to 21 records back to back with no header.
//!
//! # Record layout
//!
//! ```text
//! offset  size  field
//!      0     1  peer id
//!      1     4  update number (u32, big-endian)
//!      5     4  zone hash (u32, big-endian)
//!      9     4  location x (f32, big-endian)
//!     13     4  location y (f32, big-endian)
//!     17     4  location z (f32, big-endian)
//!     21     1  rotation x (quantized)
//!     22     1  rotation y (quantized)
//!     23     1  rotation z (quantized)
//! ```
//!
//! Both lossy steps are deliberate: locations narrow to single precision and
//! rotations quantize to 256 buckets of 360/256 degrees each.
//!
//! # Example
//!
//! ```
//! use ghostsync_core::{PeerId, PlayerSnapshot, Zone};
//! use ghostsync_wire::{decode_datagram, encode_datagram, Record};
//!
//! let record = Record {
//!     peer: PeerId(7),
//!     update_number: 1234,
//!     zone: Zone::from_name("Zone_Library"),
//!     snapshot: PlayerSnapshot::new([100.0, -50.0, 2.5], [0.0, 45.0, -90.0]),
//! };
//! let datagram = encode_datagram(&[record]).unwrap();
//! assert_eq!(datagram.len(), 24);
//!
//! let decoded = decode_datagram(&datagram).unwrap();
//! assert_eq!(decoded[0].peer, PeerId(7));
//! assert_eq!(decoded[0].snapshot.rotation(), [0.0, 45.0, -90.0]);
//! ```

mod error;

pub use error::{Result, WireError};

use ghostsync_core::{normalize_angle, PeerId, PlayerSnapshot, UpdateNumber, Zone};

/// Size of one encoded record in bytes
pub const RECORD_LEN: usize = 24;

/// Largest number of records carried by one datagram
pub const MAX_RECORDS_PER_DATAGRAM: usize = 21;

/// Largest valid datagram in bytes
pub const MAX_DATAGRAM_LEN: usize = RECORD_LEN * MAX_RECORDS_PER_DATAGRAM;

const PEER_OFFSET: usize = 0;
const UPDATE_OFFSET: usize = 1;
const ZONE_OFFSET: usize = 5;
const LOCATION_OFFSET: usize = 9;
const ROTATION_OFFSET: usize = 21;

const ROTATION_BUCKETS: f64 = 256.0;
const DEGREES_PER_TURN: f64 = 360.0;

/// One snapshot plus its envelope fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// Participant the snapshot belongs to
    pub peer: PeerId,
    /// Sender's update number for this snapshot
    pub update_number: UpdateNumber,
    /// Zone the sender was in
    pub zone: Zone,
    /// The pose itself
    pub snapshot: PlayerSnapshot,
}

/// Quantize an angle in degrees to one byte
///
/// The angle is wrapped into `[-180, 180)` first. Values within rounding
/// distance of +180 land in bucket 256, which wraps to bucket 0 (-180).
/// Non-finite input quantizes as 0 degrees.
pub fn quantize_rotation(degrees: f64) -> u8 {
    let degrees = if degrees.is_finite() {
        normalize_angle(degrees)
    } else {
        0.0
    };
    let bucket = ((degrees + 180.0) * ROTATION_BUCKETS / DEGREES_PER_TURN).floor() as u32;
    (bucket % 256) as u8
}

/// Recover the angle in degrees at the lower edge of a rotation bucket
pub fn dequantize_rotation(byte: u8) -> f64 {
    f64::from(byte) * DEGREES_PER_TURN / ROTATION_BUCKETS - 180.0
}

/// Encode a single record
pub fn encode_record(record: &Record) -> [u8; RECORD_LEN] {
    let mut bytes = [0u8; RECORD_LEN];
    bytes[PEER_OFFSET] = record.peer.raw();
    bytes[UPDATE_OFFSET..ZONE_OFFSET].copy_from_slice(&record.update_number.to_be_bytes());
    bytes[ZONE_OFFSET..LOCATION_OFFSET].copy_from_slice(&record.zone.raw().to_be_bytes());

    for (axis, value) in record.snapshot.location().into_iter().enumerate() {
        let start = LOCATION_OFFSET + axis * 4;
        bytes[start..start + 4].copy_from_slice(&(value as f32).to_be_bytes());
    }
    for (axis, value) in record.snapshot.rotation().into_iter().enumerate() {
        bytes[ROTATION_OFFSET + axis] = quantize_rotation(value);
    }
    bytes
}

/// Decode a single record
///
/// The decoded snapshot is stamped with the record's peer id.
pub fn decode_record(bytes: &[u8; RECORD_LEN]) -> Record {
    let peer = PeerId(bytes[PEER_OFFSET]);
    let update_number = read_u32(bytes, UPDATE_OFFSET);
    let zone = Zone::new(read_u32(bytes, ZONE_OFFSET));

    let mut location = [0.0f64; 3];
    for (axis, value) in location.iter_mut().enumerate() {
        let bits = read_u32(bytes, LOCATION_OFFSET + axis * 4);
        *value = f64::from(f32::from_bits(bits));
    }
    let mut rotation = [0.0f64; 3];
    for (axis, value) in rotation.iter_mut().enumerate() {
        *value = dequantize_rotation(bytes[ROTATION_OFFSET + axis]);
    }

    Record {
        peer,
        update_number,
        zone,
        snapshot: PlayerSnapshot::new(location, rotation).with_id(peer),
    }
}

/// Check that a datagram length is a positive multiple of [`RECORD_LEN`]
/// no longer than [`MAX_DATAGRAM_LEN`]
pub fn validate_length(len: usize) -> Result<()> {
    if len == 0 || len % RECORD_LEN != 0 || len > MAX_DATAGRAM_LEN {
        return Err(WireError::InvalidLength(len));
    }
    Ok(())
}

/// Decode a whole datagram
///
/// Any framing error rejects the datagram as a whole; no records are
/// returned from a malformed datagram.
pub fn decode_datagram(datagram: &[u8]) -> Result<Vec<Record>> {
    validate_length(datagram.len())?;
    Ok(datagram
        .chunks_exact(RECORD_LEN)
        .map(|chunk| {
            let mut bytes = [0u8; RECORD_LEN];
            bytes.copy_from_slice(chunk);
            decode_record(&bytes)
        })
        .collect())
}

/// Encode 1 to [`MAX_RECORDS_PER_DATAGRAM`] records as one datagram
pub fn encode_datagram(records: &[Record]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Err(WireError::Empty);
    }
    if records.len() > MAX_RECORDS_PER_DATAGRAM {
        return Err(WireError::TooManyRecords(records.len()));
    }
    let mut datagram = Vec::with_capacity(records.len() * RECORD_LEN);
    for record in records {
        datagram.extend_from_slice(&encode_record(record));
    }
    Ok(datagram)
}

/// Encode any number of records, splitting them across as many datagrams
/// as needed
pub fn encode_datagrams(records: &[Record]) -> Vec<Vec<u8>> {
    records
        .chunks(MAX_RECORDS_PER_DATAGRAM)
        .map(|chunk| {
            let mut datagram = Vec::with_capacity(chunk.len() * RECORD_LEN);
            for record in chunk {
                datagram.extend_from_slice(&encode_record(record));
            }
            datagram
        })
        .collect()
}

fn read_u32(bytes: &[u8; RECORD_LEN], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
