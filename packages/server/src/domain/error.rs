//! ドメイン層のエラー型

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// トリム後のメッセージ本文が空
    #[error("Message body is empty")]
    EmptyMessageBody,
}

/// 接続レジストリ（Hub）の契約違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// 同じ接続が既に登録されている
    #[error("Connection '{0}' is already registered")]
    DuplicateConnection(String),

    /// 接続が登録されていない
    #[error("Connection '{0}' is not registered")]
    ConnectionNotFound(String),

    /// 登録前に接続の書き込み側が閉じた
    #[error("Connection '{0}' closed before joining")]
    ChannelClosed(String),
}

/// メッセージストアのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 永続化層が書き込み・読み込みを受け付けなかった
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 送信先の接続が存在しない
    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    /// 送信チャンネルが閉じている
    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
