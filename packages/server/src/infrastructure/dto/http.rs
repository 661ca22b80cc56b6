//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::HistoryEntry;

/// Participant as shown to the reporting side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub nick: String,
    pub joined_ms: i64,
    /// RFC 3339 (UTC) rendering of `joined_ms`
    pub joined_at: String,
}

/// `GET /api/participants`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantListDto {
    pub participants: Vec<ParticipantDto>,
    pub count: usize,
}

/// `GET /api/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageListDto {
    pub messages: Vec<HistoryEntry>,
    pub count: usize,
}

/// `GET /api/admin/state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStateDto {
    pub ok: bool,
    pub time_ms: i64,
    pub clients: Vec<ParticipantDto>,
    pub clients_count: usize,
    pub messages: Vec<HistoryEntry>,
    pub messages_count: usize,
}
