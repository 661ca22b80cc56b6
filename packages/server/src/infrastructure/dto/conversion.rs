//! Conversion logic between domain entities and DTOs.

use veranda_shared::time::timestamp_to_rfc3339;

use crate::domain::entity;
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<entity::ChatMessage> for dto::HistoryEntry {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            ts_ms: model.timestamp.value(),
            nick: model.author.into_string(),
            text: model.body.into_string(),
        }
    }
}

impl From<entity::ChatMessage> for dto::ChatBroadcastMessage {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            r#type: dto::MessageType::Message,
            nick: model.author.into_string(),
            text: model.body.into_string(),
            time_ms: model.timestamp.value(),
        }
    }
}

impl From<entity::Participant> for http::ParticipantDto {
    fn from(model: entity::Participant) -> Self {
        Self {
            nick: model.name.into_string(),
            joined_ms: model.joined_at.value(),
            joined_at: timestamp_to_rfc3339(model.joined_at.value()),
        }
    }
}

impl From<entity::RegistrySnapshot> for http::ParticipantListDto {
    fn from(snapshot: entity::RegistrySnapshot) -> Self {
        Self {
            count: snapshot.count,
            participants: snapshot.participants.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Vec<entity::ChatMessage>> for dto::HistoryMessage {
    fn from(messages: Vec<entity::ChatMessage>) -> Self {
        Self::new(messages.into_iter().map(Into::into).collect())
    }
}
