//! Client configuration
//!
//! Read once at startup from a RON file. Every field is optional; missing
//! fields take their defaults, and a missing file means all defaults.
//!
//! # Example
//!
//! ```
//! use ghostsync_netcode::ClientConfig;
//!
//! let config = ClientConfig::from_ron_str(r#"(address: "10.0.0.5", name: "Sybil")"#).unwrap();
//! assert_eq!(config.control_uri(), "ws://10.0.0.5:8080");
//! assert_eq!(config.name(), "Sybil");
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Connection and identity settings for a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server host name or IP address
    address: String,
    /// Server port, shared by the control and data channels
    port: u16,
    /// Display name shown to other participants
    name: String,
    /// Display color as RGB
    color: [u8; 3],
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            name: "Player".to_string(),
            color: [255, 255, 255],
        }
    }
}

impl ClientConfig {
    /// Parse a configuration from RON text
    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Load a configuration file, falling back to defaults if it is missing
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!(
                "Settings file {} not found, using default settings",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_ron_str(&content)?;
        log::info!("Loaded settings from {}", path.display());
        log::debug!("{config:?}");
        Ok(config)
    }

    /// Server host name or IP address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Server port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display color as RGB
    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    /// URI of the control channel endpoint
    pub fn control_uri(&self) -> String {
        format!("ws://{}:{}", self.address, self.port)
    }

    /// `host:port` of the data channel endpoint
    pub fn data_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
