//! WebSocket を使った MessagePusher 実装（Broadcast Engine）
//!
//! ## 責務
//!
//! - 接続テーブルに登録された送信チャンネルへのメッセージ送信（push_to, broadcast）
//! - 配信に失敗した接続のテーブルからの削除
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! UI 層は送信チャンネルを作り、受信側を書き込みタスクに渡します。
//! 書き込みタスクが終了すると受信側が破棄され、ここでの送信が失敗します。
//!
//! 接続テーブルは `InMemoryParticipantRegistry` と共有します。ブロードキャストは
//! テーブルのロックを保持したまま走査・送信・削除を行うため、走査中に他の
//! 変更が割り込むことはありません。チャンネルは非有界なので送信で待たされる
//! ことはなく、ロックの保持時間は接続数に比例する程度です。

use async_trait::async_trait;

use crate::{
    domain::{BroadcastReport, ConnectionId, MessagePushError, MessagePusher},
    infrastructure::repository::SharedConnectionTable,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let table = ConnectionTable::shared();
/// let pusher = WebSocketMessagePusher::new(table.clone());
///
/// // 全員に送信
/// let report = pusher.broadcast("{\"type\":\"system\",\"text\":\"hi\"}").await;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信チャンネル（レジストリと共有）
    table: SharedConnectionTable,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(table: SharedConnectionTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn push_to(&self, id: &ConnectionId, content: &str) -> Result<(), MessagePushError> {
        let table = self.table.lock().await;

        let entry = table
            .entries
            .get(id)
            .ok_or_else(|| MessagePushError::ClientNotFound(id.to_string()))?;
        entry
            .channel
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", id);
        Ok(())
    }

    async fn broadcast(&self, content: &str) -> BroadcastReport {
        let mut table = self.table.lock().await;
        let mut report = BroadcastReport::default();

        for (id, entry) in table.entries.iter() {
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = entry.channel.send(content.to_string()) {
                tracing::warn!("Failed to push message to connection '{}': {}", id, e);
                report.pruned.push(*id);
            } else {
                report.delivered += 1;
            }
        }

        for id in &report.pruned {
            table.remove(id);
            tracing::info!("Connection '{}' pruned after failed delivery", id);
        }

        report
    }
}
