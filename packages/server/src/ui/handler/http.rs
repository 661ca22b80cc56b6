//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use veranda_shared::time::now_millis;

use crate::{
    infrastructure::dto::{
        http::{AdminStateDto, MessageListDto, ParticipantDto, ParticipantListDto},
        websocket::HistoryEntry,
    },
    ui::state::AppState,
    usecase::BACKLOG_LIMIT,
};

/// Default page size of `GET /api/messages`
const DEFAULT_MESSAGE_LIMIT: usize = 50;
/// Upper bound of `limit` on `GET /api/messages`
const MAX_MESSAGE_LIMIT: usize = 1000;

/// Query parameters for `GET /api/messages`
#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<usize>,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Live participants plus the recent history, in one document
pub async fn admin_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdminStateDto>, StatusCode> {
    let snapshot = state.get_hub_state_usecase.live_snapshot().await;
    let messages = state
        .get_hub_state_usecase
        .recent_messages(BACKLOG_LIMIT)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load messages for admin state: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    // Domain Model から DTO への変換
    let clients: Vec<ParticipantDto> = snapshot
        .participants
        .into_iter()
        .map(ParticipantDto::from)
        .collect();
    let messages: Vec<HistoryEntry> = messages.into_iter().map(HistoryEntry::from).collect();

    Ok(Json(AdminStateDto {
        ok: true,
        time_ms: now_millis(),
        clients_count: snapshot.count,
        clients,
        messages_count: messages.len(),
        messages,
    }))
}

/// Connected participants in join order
pub async fn list_participants(State(state): State<Arc<AppState>>) -> Json<ParticipantListDto> {
    let snapshot = state.get_hub_state_usecase.live_snapshot().await;
    Json(ParticipantListDto::from(snapshot))
}

/// Most recent messages, oldest first
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessageListDto>, StatusCode> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_MESSAGE_LIMIT)
        .min(MAX_MESSAGE_LIMIT);
    let messages = state
        .get_hub_state_usecase
        .recent_messages(limit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load messages: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let messages: Vec<HistoryEntry> = messages.into_iter().map(HistoryEntry::from).collect();
    Ok(Json(MessageListDto {
        count: messages.len(),
        messages,
    }))
}
