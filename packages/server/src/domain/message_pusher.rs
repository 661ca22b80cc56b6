//! MessagePusher trait 定義
//!
//! クライアントへのメッセージ通知の抽象化。
//! UseCase 層はこの trait に依存し、送信手段（WebSocket 等）には依存しない。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// 接続ごとの送信チャンネル
///
/// 受信側は接続の書き込みタスクが保持する。書き込みに失敗すると受信側が
/// 破棄され、以降の送信はエラーになる。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// ブロードキャストの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 配信に成功した接続数
    pub delivered: usize,
    /// 配信に失敗し、レジストリから取り除かれた接続
    pub pruned: Vec<ConnectionId>,
}

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 特定の接続にだけ送信
    async fn push_to(&self, id: &ConnectionId, content: &str) -> Result<(), MessagePushError>;

    /// 登録中の全接続に送信
    ///
    /// 1 つの接続の失敗で中断しない。失敗した接続は走査後に削除される。
    async fn broadcast(&self, content: &str) -> BroadcastReport;
}
