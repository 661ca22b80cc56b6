//! Per-connection session state machine.
//!
//! `Connecting → Active → Closed`. The session is transport-agnostic: the
//! WebSocket handler feeds it inbound text frames, and everything it sends goes
//! through the connection's outbound channel.

use std::sync::Arc;

use serde::Serialize;
use veranda_shared::time::now_millis;

use crate::{
    domain::{ChatMessage, ConnectionId, ConnectionIdFactory, DisplayName, PusherChannel},
    infrastructure::dto::websocket::{
        ChatBroadcastMessage, ClientFrame, HistoryMessage, PongMessage, SystemNotice,
    },
    ui::state::AppState,
    usecase::{ConnectError, SendMessageError},
};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closed,
}

/// Serialize an outbound payload, logging instead of failing the session.
fn encode<T: Serialize>(payload: &T) -> Option<String> {
    match serde_json::to_string(payload) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to serialize outbound payload: {}", e);
            None
        }
    }
}

/// Per-connection protocol handler
///
/// If the session is dropped while still `Active` (the owning task panicked or
/// was cancelled), the departure is still announced from a detached task. A
/// runtime that is itself shutting down will not run that task; server shutdown
/// closes sessions through `close` instead.
pub struct ChatSession {
    id: ConnectionId,
    state: SessionState,
    /// Last known display name, used for the departure notice even if the
    /// connection was already pruned from the registry.
    name: DisplayName,
    app: Arc<AppState>,
}

impl ChatSession {
    pub fn new(app: Arc<AppState>) -> Self {
        Self {
            id: ConnectionIdFactory::generate(),
            state: SessionState::Connecting,
            name: DisplayName::default(),
            app,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Join the hub: queue the backlog and register in one step, then announce.
    ///
    /// # Arguments
    ///
    /// * `sender` - Outbound channel drained by the connection's writer task
    pub async fn open(&mut self, sender: PusherChannel) -> Result<(), ConnectError> {
        if self.state != SessionState::Connecting {
            return Ok(());
        }

        let id = self.id;
        let render_backlog = move |backlog: Vec<ChatMessage>| {
            tracing::debug!("Replaying {} backlog messages to '{}'", backlog.len(), id);
            encode(&HistoryMessage::from(backlog))
                .or_else(|| encode(&HistoryMessage::new(Vec::new())))
                .unwrap_or_default()
        };

        let participant = match self
            .app
            .connect_participant_usecase
            .execute(self.id, sender, render_backlog)
            .await
        {
            Ok(participant) => participant,
            Err(e) => {
                self.state = SessionState::Closed;
                return Err(e);
            }
        };
        self.state = SessionState::Active;
        self.name = participant.name;
        tracing::info!("Connection '{}' joined as '{}'", self.id, self.name);

        let notice = SystemNotice::new(format!("{} connected", self.name), now_millis());
        if let Some(json) = encode(&notice) {
            let report = self
                .app
                .connect_participant_usecase
                .broadcast_participant_joined(&json)
                .await;
            tracing::debug!(
                "Broadcasted join of '{}' to {} connections",
                self.id,
                report.delivered
            );
        }
        Ok(())
    }

    /// Process one inbound text frame.
    ///
    /// Malformed frames and unknown kinds are ignored. Failures only affect
    /// the current frame.
    pub async fn handle_text(&mut self, text: &str) {
        if self.state != SessionState::Active {
            tracing::debug!("Ignoring frame on inactive session '{}'", self.id);
            return;
        }

        let frame = match ClientFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("Ignoring undecodable frame from '{}': {}", self.id, e);
                return;
            }
        };

        match frame {
            ClientFrame::SetNick { nick } => self.rename(&nick).await,
            ClientFrame::Message { text } => self.send_message(&text).await,
            ClientFrame::Ping => self.acknowledge_ping().await,
        }
    }

    async fn rename(&mut self, raw_name: &str) {
        let change = match self
            .app
            .rename_participant_usecase
            .execute(&self.id, raw_name)
            .await
        {
            Ok(change) => change,
            Err(e) => {
                tracing::warn!("Rename failed: {}", e);
                return;
            }
        };
        self.name = change.new.clone();
        tracing::info!(
            "Connection '{}' renamed '{}' -> '{}'",
            self.id,
            change.old,
            change.new
        );

        let notice = SystemNotice::new(format!("{} -> {}", change.old, change.new), now_millis());
        if let Some(json) = encode(&notice) {
            self.app
                .rename_participant_usecase
                .broadcast_name_changed(&json)
                .await;
        }
    }

    async fn send_message(&self, raw_text: &str) {
        let message = match self
            .app
            .send_message_usecase
            .execute(&self.id, raw_text)
            .await
        {
            Ok(message) => message,
            Err(SendMessageError::EmptyBody) => {
                tracing::debug!("Ignoring empty message from '{}'", self.id);
                return;
            }
            Err(e @ SendMessageError::Persistence(_)) => {
                tracing::error!("Message from '{}' dropped: {}", self.id, e);
                return;
            }
            Err(e) => {
                tracing::warn!("Message from '{}' dropped: {}", self.id, e);
                return;
            }
        };

        if let Some(json) = encode(&ChatBroadcastMessage::from(message)) {
            let report = self.app.send_message_usecase.broadcast_message(&json).await;
            tracing::debug!(
                "Broadcasted message from '{}' to {} connections ({} pruned)",
                self.id,
                report.delivered,
                report.pruned.len()
            );
        }
    }

    async fn acknowledge_ping(&self) {
        let Some(json) = encode(&PongMessage::new(now_millis())) else {
            return;
        };
        if let Err(e) = self
            .app
            .acknowledge_ping_usecase
            .execute(&self.id, &json)
            .await
        {
            tracing::debug!("Failed to acknowledge ping from '{}': {}", self.id, e);
        }
    }

    /// Leave the hub. Idempotent.
    pub async fn close(&mut self) {
        if self.state != SessionState::Active {
            self.state = SessionState::Closed;
            return;
        }
        self.state = SessionState::Closed;
        leave(&self.app, self.id, &self.name).await;
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if self.state != SessionState::Active {
            return;
        }
        self.state = SessionState::Closed;

        let app = self.app.clone();
        let id = self.id;
        let name = self.name.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { leave(&app, id, &name).await });
            }
            Err(_) => {
                tracing::warn!("Session '{}' dropped outside a runtime; no departure notice", id);
            }
        }
    }
}

/// Deregister and announce departure.
async fn leave(app: &AppState, id: ConnectionId, name: &DisplayName) {
    let removed = app.disconnect_participant_usecase.execute(&id).await;
    tracing::info!(
        "Connection '{}' ({}) left{}",
        id,
        name,
        if removed.is_some() {
            ""
        } else {
            " (already pruned)"
        }
    );

    let notice = SystemNotice::new(format!("{} disconnected", name), now_millis());
    if let Some(json) = encode(&notice) {
        app.disconnect_participant_usecase
            .broadcast_participant_left(&json)
            .await;
    }
}
