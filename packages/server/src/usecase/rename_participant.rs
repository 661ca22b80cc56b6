//! UseCase: 表示名変更

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, ConnectionId, DisplayName, MessagePusher, NameChange, ParticipantRegistry,
};

use super::error::RenameError;

/// 表示名変更のユースケース
pub struct RenameParticipantUseCase {
    registry: Arc<dyn ParticipantRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RenameParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 入力を正規化して表示名を変更する
    ///
    /// 空白のみの入力は "Guest" に戻す。
    pub async fn execute(
        &self,
        id: &ConnectionId,
        raw_name: &str,
    ) -> Result<NameChange, RenameError> {
        self.registry
            .rename(id, DisplayName::normalize(raw_name))
            .await
            .map_err(|_| RenameError::ParticipantNotFound(id.to_string()))
    }

    /// 名前変更を全員にブロードキャスト
    pub async fn broadcast_name_changed(&self, message: &str) -> BroadcastReport {
        self.message_pusher.broadcast(message).await
    }
}
