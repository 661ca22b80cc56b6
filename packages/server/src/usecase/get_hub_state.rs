//! UseCase: Hub の状態取得（管理・表示用）

use std::sync::Arc;

use crate::domain::{
    ChatMessage, MessageRepository, ParticipantRegistry, RegistrySnapshot, RepositoryError,
};

/// 管理画面などの外部向けに Hub の状態を返すユースケース
pub struct GetHubStateUseCase {
    registry: Arc<dyn ParticipantRegistry>,
    repository: Arc<dyn MessageRepository>,
}

impl GetHubStateUseCase {
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        repository: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            registry,
            repository,
        }
    }

    /// 接続中の参加者のスナップショット
    pub async fn live_snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot().await
    }

    /// 直近 `limit` 件のメッセージ（古い順）
    pub async fn recent_messages(
        &self,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.repository.recent(limit).await
    }
}
