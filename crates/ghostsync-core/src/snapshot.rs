//! Player pose snapshots

use crate::{Error, PeerId, Result};
use serde::{Deserialize, Serialize};

/// Wrap an angle in degrees into `[-180, 180)`.
///
/// Non-finite input is returned unchanged.
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return degrees;
    }
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid may round up to the modulus itself
    if wrapped >= 180.0 {
        -180.0
    } else {
        wrapped
    }
}

/// A participant's pose at one instant
///
/// Location is in world units, rotation in degrees with every component in
/// `[-180, 180)`. Snapshots are replaced wholesale, never patched; the only
/// thing the sync core changes is the identifier stamp via [`with_id`].
///
/// [`with_id`]: PlayerSnapshot::with_id
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    id: PeerId,
    location: [f64; 3],
    rotation: [f64; 3],
}

impl PlayerSnapshot {
    /// Create a snapshot, wrapping each rotation component into `[-180, 180)`
    pub fn new(location: [f64; 3], rotation: [f64; 3]) -> Self {
        Self {
            id: PeerId::default(),
            location,
            rotation: rotation.map(normalize_angle),
        }
    }

    /// Create a snapshot, rejecting NaN or infinite components
    pub fn try_new(location: [f64; 3], rotation: [f64; 3]) -> Result<Self> {
        for value in location {
            if !value.is_finite() {
                return Err(Error::NonFinite {
                    field: "location",
                    value,
                });
            }
        }
        for value in rotation {
            if !value.is_finite() {
                return Err(Error::NonFinite {
                    field: "rotation",
                    value,
                });
            }
        }
        Ok(Self::new(location, rotation))
    }

    /// Return a copy stamped with the given participant identifier
    pub fn with_id(self, id: PeerId) -> Self {
        Self { id, ..self }
    }

    /// Identifier of the participant this pose belongs to
    pub fn id(&self) -> PeerId {
        self.id
    }

    /// Location `[x, y, z]` in world units
    pub fn location(&self) -> [f64; 3] {
        self.location
    }

    /// Rotation `[x, y, z]` in degrees
    pub fn rotation(&self) -> [f64; 3] {
        self.rotation
    }
}
