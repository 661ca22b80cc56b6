//! Server state and connection management.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::watch;

use crate::{
    domain::{MessagePusher, MessageRepository, ParticipantRegistry},
    usecase::{
        AcknowledgePingUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetHubStateUseCase, RenameParticipantUseCase, SendMessageUseCase,
    },
};

/// Transport-level liveness settings for every connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Interval between WebSocket pings sent by the server
    pub heartbeat_interval: Duration,
    /// A connection with no inbound frame for this long is closed
    pub idle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(25),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// Shared application state
///
/// Constructed once per process and shared by every connection task.
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// RenameParticipantUseCase（表示名変更のユースケース）
    pub rename_participant_usecase: Arc<RenameParticipantUseCase>,
    /// AcknowledgePingUseCase（生存確認応答のユースケース）
    pub acknowledge_ping_usecase: Arc<AcknowledgePingUseCase>,
    /// GetHubStateUseCase（Hub 状態取得のユースケース）
    pub get_hub_state_usecase: Arc<GetHubStateUseCase>,
    /// Liveness settings
    pub session_config: SessionConfig,
    /// Raised once when the server starts shutting down
    shutdown: watch::Sender<bool>,
}

impl AppState {
    /// Wire every use case on top of one registry, store and pusher.
    ///
    /// `registry` and `message_pusher` must share the same connection table.
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                registry.clone(),
                repository.clone(),
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                registry.clone(),
                repository.clone(),
                message_pusher.clone(),
            )),
            rename_participant_usecase: Arc::new(RenameParticipantUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            acknowledge_ping_usecase: Arc::new(AcknowledgePingUseCase::new(
                message_pusher.clone(),
            )),
            get_hub_state_usecase: Arc::new(GetHubStateUseCase::new(registry, repository)),
            session_config,
            shutdown: watch::channel(false).0,
        }
    }

    /// Ask every open session to close.
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Resolves once `begin_shutdown` has been called.
    pub fn shutdown_requested(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.shutdown.subscribe();
        async move {
            let _ = rx.wait_for(|stopping| *stopping).await;
        }
    }
}
