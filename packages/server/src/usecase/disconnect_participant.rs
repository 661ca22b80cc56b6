//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() と退出通知のブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 切断経路（ピアの切断・タイムアウト・配信失敗による削除）は競合しうるため、
//!   削除が冪等であることを保証する
//! - 退出通知が残りの参加者に届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と通知
//! - エッジケース：最後の参加者の切断、既に削除済みの接続の切断

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, ConnectionId, MessagePusher, Participant, ParticipantRegistry,
};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Registry（接続中の参加者）
    registry: Arc<dyn ParticipantRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// 削除された参加者。既に削除済み（配信失敗で取り除かれた等）なら `None`。
    pub async fn execute(&self, id: &ConnectionId) -> Option<Participant> {
        self.registry.deregister(id).await
    }

    /// 参加者が退出したことを残りの参加者にブロードキャスト
    pub async fn broadcast_participant_left(&self, message: &str) -> BroadcastReport {
        self.message_pusher.broadcast(message).await
    }
}
