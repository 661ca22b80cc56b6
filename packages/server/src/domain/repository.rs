//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use super::{
    ChatMessage, ConnectionId, DisplayName, MessageBody, NameChange, Participant, PusherChannel,
    RegistryError, RegistrySnapshot, RepositoryError,
};

/// Message Store trait
///
/// 追記専用のメッセージログ。挿入順（ID 昇順）が唯一の順序の基準。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを追記する
    ///
    /// タイムスタンプと ID を割り当て、永続化が完了してから返す。
    async fn append(
        &self,
        author: DisplayName,
        body: MessageBody,
    ) -> Result<ChatMessage, RepositoryError>;

    /// 直近 `limit` 件を古い順で返す
    ///
    /// 並行する `append` の結果は見えても見えなくてもよい。
    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, RepositoryError>;
}

/// Connection Registry (Hub) trait
///
/// 全ての操作は単一の排他区間を通して直列化される。
#[async_trait]
pub trait ParticipantRegistry: Send + Sync {
    /// 接続を登録し、デフォルト名の参加者を作成
    async fn register(
        &self,
        id: ConnectionId,
        channel: PusherChannel,
    ) -> Result<Participant, RegistryError>;

    /// 最初のフレームを送り、同じ排他区間のまま接続を登録する
    ///
    /// `greeting` は排他区間の中で評価される。評価中に始まったブロードキャストは
    /// 登録が終わるまで待たされ、その後この接続にも届く。そのため最初のフレームより
    /// 先に届くものはなく、`greeting` が読んだ時点以降の更新も取りこぼさない。
    async fn register_with_greeting(
        &self,
        id: ConnectionId,
        channel: PusherChannel,
        greeting: BoxFuture<'static, String>,
    ) -> Result<Participant, RegistryError>;

    /// 接続を削除（未登録なら何もしない）
    async fn deregister(&self, id: &ConnectionId) -> Option<Participant>;

    /// 表示名を変更
    async fn rename(
        &self,
        id: &ConnectionId,
        name: DisplayName,
    ) -> Result<NameChange, RegistryError>;

    /// 現在の参加者レコードを取得
    async fn find(&self, id: &ConnectionId) -> Option<Participant>;

    /// 一貫したスナップショットを取得
    async fn snapshot(&self) -> RegistrySnapshot;
}
