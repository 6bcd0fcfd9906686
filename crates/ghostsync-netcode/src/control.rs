//! Control channel protocol
//!
//! Control messages are JSON objects with a string `type` field:
//!
//! ```text
//! client -> server   {"type":"Connect"}
//! server -> client   {"type":"Connected","id":3,"players":[1,7]}
//!                    {"type":"PlayerJoined","id":9}
//!                    {"type":"PlayerLeft","id":7}
//! ```
//!
//! Identifiers must be unsigned integers that fit in one byte. Parsing is
//! all-or-nothing: a message with any invalid field is rejected whole.

use ghostsync_core::PeerId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Kinds of server-to-client message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Connected,
    PlayerJoined,
    PlayerLeft,
}

impl MessageKind {
    fn from_type(message_type: &str) -> Option<Self> {
        match message_type {
            "Connected" => Some(Self::Connected),
            "PlayerJoined" => Some(Self::PlayerJoined),
            "PlayerLeft" => Some(Self::PlayerLeft),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connected => "Connected",
            Self::PlayerJoined => "PlayerJoined",
            Self::PlayerLeft => "PlayerLeft",
        };
        f.write_str(name)
    }
}

/// Why a control message was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("message is not an object")]
    NotAnObject,

    #[error("message has no type field")]
    MissingType,

    #[error("message type field is not a string")]
    NonStringType,

    #[error("unknown message type {0:?}")]
    UnknownType(String),

    #[error("invalid {kind} message: {reason}")]
    InvalidPayload { kind: MessageKind, reason: String },
}

impl ProtocolError {
    /// The message kind, if the `type` field was recognized
    pub fn kind(&self) -> Option<MessageKind> {
        match self {
            Self::InvalidPayload { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Message sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Request to join the session
    Connect,
}

impl ClientMessage {
    /// Serialize as a JSON text message
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::Serialization(e.to_string()))
    }
}

/// Message sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Connection accepted: our id and everyone already present
    Connected { id: PeerId, players: Vec<PeerId> },
    /// Another participant joined
    PlayerJoined { id: PeerId },
    /// A participant left
    PlayerLeft { id: PeerId },
}

#[derive(Deserialize)]
struct ConnectedPayload {
    id: PeerId,
    players: Vec<PeerId>,
}

#[derive(Deserialize)]
struct PeerPayload {
    id: PeerId,
}

impl ServerMessage {
    /// Parse and validate a text message
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        let Value::Object(object) = value else {
            return Err(ProtocolError::NotAnObject);
        };
        let kind = match object.get("type") {
            None => return Err(ProtocolError::MissingType),
            Some(Value::String(message_type)) => MessageKind::from_type(message_type)
                .ok_or_else(|| ProtocolError::UnknownType(message_type.clone()))?,
            Some(_) => return Err(ProtocolError::NonStringType),
        };

        match kind {
            MessageKind::Connected => {
                let payload: ConnectedPayload = payload(kind, object)?;
                Ok(Self::Connected {
                    id: payload.id,
                    players: payload.players,
                })
            }
            MessageKind::PlayerJoined => {
                let payload: PeerPayload = payload(kind, object)?;
                Ok(Self::PlayerJoined { id: payload.id })
            }
            MessageKind::PlayerLeft => {
                let payload: PeerPayload = payload(kind, object)?;
                Ok(Self::PlayerLeft { id: payload.id })
            }
        }
    }

    /// The kind of this message
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Connected { .. } => MessageKind::Connected,
            Self::PlayerJoined { .. } => MessageKind::PlayerJoined,
            Self::PlayerLeft { .. } => MessageKind::PlayerLeft,
        }
    }

    /// Serialize as a JSON text message
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::Serialization(e.to_string()))
    }
}

fn payload<T: DeserializeOwned>(
    kind: MessageKind,
    object: Map<String, Value>,
) -> Result<T, ProtocolError> {
    serde_json::from_value(Value::Object(object)).map_err(|e| ProtocolError::InvalidPayload {
        kind,
        reason: e.to_string(),
    })
}
