//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object whose `type` field selects the kind.

use serde::{Deserialize, Serialize};

/// Discriminator of outbound frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    History,
    Message,
    System,
    Pong,
}

/// Inbound frame sent by a participant.
///
/// Unknown `type` values and malformed payloads fail to decode and are ignored
/// by the session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Rename request
    SetNick {
        #[serde(default)]
        nick: String,
    },
    /// Chat message
    Message {
        #[serde(default)]
        text: String,
    },
    /// Liveness probe
    Ping,
}

impl ClientFrame {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// One persisted message inside a backlog frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ts_ms: i64,
    pub nick: String,
    pub text: String,
}

/// Backlog replayed to a newly connected participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub r#type: MessageType,
    pub messages: Vec<HistoryEntry>,
}

impl HistoryMessage {
    pub fn new(messages: Vec<HistoryEntry>) -> Self {
        Self {
            r#type: MessageType::History,
            messages,
        }
    }
}

/// Chat message broadcast to everyone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBroadcastMessage {
    pub r#type: MessageType,
    pub nick: String,
    pub text: String,
    pub time_ms: i64,
}

/// Join / leave / rename announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemNotice {
    pub r#type: MessageType,
    pub text: String,
    pub time_ms: i64,
}

impl SystemNotice {
    pub fn new(text: String, time_ms: i64) -> Self {
        Self {
            r#type: MessageType::System,
            text,
            time_ms,
        }
    }
}

/// Reply to a liveness probe (sent to the requester only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongMessage {
    pub r#type: MessageType,
    pub time_ms: i64,
}

impl PongMessage {
    pub fn new(time_ms: i64) -> Self {
        Self {
            r#type: MessageType::Pong,
            time_ms,
        }
    }
}
