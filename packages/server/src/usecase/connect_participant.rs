//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase の execute（バックログ送信と登録）/ broadcast_participant_joined
//!
//! ### なぜこのテストが必要か
//! - 新規接続には、以降のどのブロードキャストよりも先にバックログが届く必要がある
//! - 重複登録（契約違反）を検出できることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：バックログ送信と登録
//! - 異常系：重複した接続の登録、登録前に書き込み側が閉じた接続
//! - エッジケース：ストアの読み込み失敗（空のバックログで接続は継続）

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, ChatMessage, ConnectionId, MessagePusher, MessageRepository, Participant,
    ParticipantRegistry, PusherChannel, RegistryError,
};

use super::error::ConnectError;

/// バックログ（直近 200 件、古い順）を取得
///
/// ストアの読み込みに失敗した場合は空のバックログで接続を続ける。
async fn load_backlog(repository: &dyn MessageRepository) -> Vec<ChatMessage> {
    match repository.recent(BACKLOG_LIMIT).await {
        Ok(messages) => messages,
        Err(e) => {
            tracing::error!("Failed to load backlog: {}", e);
            Vec::new()
        }
    }
}

/// 接続時に再送するメッセージ数
pub const BACKLOG_LIMIT: usize = 200;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Registry（接続中の参加者）
    registry: Arc<dyn ParticipantRegistry>,
    /// Repository（メッセージストア）
    repository: Arc<dyn MessageRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            repository,
            message_pusher,
        }
    }

    /// 参加者接続を実行
    ///
    /// バックログの読み込み・送信チャンネルへの積み込み・登録を、レジストリの
    /// 1 つの排他区間で行う。バックログは以降のどのブロードキャストよりも先に届き、
    /// 読み込み後に保存されたメッセージもブロードキャストで必ず届く。
    ///
    /// # Arguments
    ///
    /// * `id` - 接続ハンドル
    /// * `sender` - この接続への送信チャンネル
    /// * `render_backlog` - バックログをフレームに変換する関数（DTO 層が提供）
    ///
    /// # Returns
    ///
    /// * `Ok(Participant)` - 登録された参加者
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute<F>(
        &self,
        id: ConnectionId,
        sender: PusherChannel,
        render_backlog: F,
    ) -> Result<Participant, ConnectError>
    where
        F: FnOnce(Vec<ChatMessage>) -> String + Send + 'static,
    {
        let repository = self.repository.clone();
        let greeting = Box::pin(async move {
            let backlog = load_backlog(repository.as_ref()).await;
            render_backlog(backlog)
        });

        self.registry
            .register_with_greeting(id, sender, greeting)
            .await
            .map_err(|e| match e {
                RegistryError::ChannelClosed(id) => ConnectError::ConnectionClosed(id),
                RegistryError::DuplicateConnection(id) | RegistryError::ConnectionNotFound(id) => {
                    ConnectError::DuplicateConnection(id)
                }
            })
    }

    /// 参加者が join したことを全員にブロードキャスト
    pub async fn broadcast_participant_joined(&self, message: &str) -> BroadcastReport {
        self.message_pusher.broadcast(message).await
    }
}
