//! UseCase 層のエラー型

use thiserror::Error;

/// 参加者接続のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// 同じ接続が既に登録されている（契約違反）
    #[error("Connection '{0}' is already registered")]
    DuplicateConnection(String),

    /// 登録前に接続の書き込み側が閉じた
    #[error("Connection '{0}' closed before joining")]
    ConnectionClosed(String),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// トリム後の本文が空
    #[error("Message body is empty")]
    EmptyBody,

    /// 送信者が登録されていない
    #[error("Sender '{0}' is not registered")]
    SenderNotFound(String),

    /// 永続化に失敗した（ブロードキャストはしない）
    #[error("Failed to persist message: {0}")]
    Persistence(String),
}

/// 名前変更のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    /// 接続が登録されていない
    #[error("Connection '{0}' is not registered")]
    ParticipantNotFound(String),
}
