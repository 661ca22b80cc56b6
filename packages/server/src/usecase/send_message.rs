//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute()（検証・永続化）と broadcast_message()
//!
//! ### なぜこのテストが必要か
//! - 空白のみの本文は保存もブロードキャストもされないことを保証
//! - 長すぎる本文がちょうど 500 文字に切り詰められることを保証
//! - 作者名は送信時点のスナップショットで、後の名前変更の影響を受けないことを確認
//! - 永続化に失敗したメッセージはブロードキャストされないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージの保存とブロードキャスト
//! - 異常系：空本文、未登録の送信者、永続化失敗
//! - エッジケース：600 文字の本文

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, ChatMessage, ConnectionId, MessageBody, MessagePusher, MessageRepository,
    ParticipantRegistry,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Registry（送信者の現在の表示名の取得元）
    registry: Arc<dyn ParticipantRegistry>,
    /// Repository（メッセージストア）
    repository: Arc<dyn MessageRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
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

    /// メッセージを検証して永続化する
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者の接続ハンドル
    /// * `raw_text` - 受信した本文（未加工）
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 永続化されたメッセージ（ブロードキャスト用）
    /// * `Err(SendMessageError)` - 検証・永続化の失敗
    pub async fn execute(
        &self,
        sender_id: &ConnectionId,
        raw_text: &str,
    ) -> Result<ChatMessage, SendMessageError> {
        // 1. 本文の検証（トリム・500 文字に切り詰め）
        let body = MessageBody::parse(raw_text).map_err(|_| SendMessageError::EmptyBody)?;

        // 2. 送信時点の表示名を取得
        let author = self
            .registry
            .find(sender_id)
            .await
            .ok_or_else(|| SendMessageError::SenderNotFound(sender_id.to_string()))?
            .name;

        // 3. 永続化（完了してからでないとブロードキャストしない）
        self.repository
            .append(author, body)
            .await
            .map_err(|e| SendMessageError::Persistence(e.to_string()))
    }

    /// 永続化済みメッセージを全員にブロードキャスト
    pub async fn broadcast_message(&self, message: &str) -> BroadcastReport {
        self.message_pusher.broadcast(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionIdFactory, DisplayName, MockMessageRepository, RepositoryError},
        usecase::test_helpers::{TestHub, create_test_hub},
    };
    use tokio::sync::mpsc;

    fn create_usecase(hub: &TestHub) -> SendMessageUseCase {
        SendMessageUseCase::new(
            hub.registry.clone(),
            hub.repository.clone(),
            hub.message_pusher.clone(),
        )
    }

    async fn register(hub: &TestHub) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let id = ConnectionIdFactory::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        hub.registry.register(id, tx).await.unwrap();
        (id, rx)
    }

    #[tokio::test]
    async fn test_send_message_success() {
        // テスト項目: メッセージが現在の表示名で保存される
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = create_usecase(&hub);
        let (alice, _rx) = register(&hub).await;
        hub.registry
            .rename(&alice, DisplayName::normalize("alice"))
            .await
            .unwrap();

        // when (操作):
        let message = usecase.execute(&alice, "  Hello!  ").await.unwrap();

        // then (期待する結果):
        assert_eq!(message.author.as_str(), "alice");
        assert_eq!(message.body.as_str(), "Hello!");
        let stored = hub.repository.recent(10).await.unwrap();
        assert_eq!(stored, vec![message]);
    }

    #[tokio::test]
    async fn test_send_whitespace_only_is_rejected() {
        // テスト項目: 空白のみの本文は保存されない
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = create_usecase(&hub);
        let (alice, _rx) = register(&hub).await;

        // when (操作):
        let result = usecase.execute(&alice, " \t\n ").await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::EmptyBody));
        assert!(hub.repository.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_long_message_truncated_to_500() {
        // テスト項目: 600 文字の本文はちょうど 500 文字で保存される
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = create_usecase(&hub);
        let (alice, _rx) = register(&hub).await;

        // when (操作):
        let message = usecase.execute(&alice, &"y".repeat(600)).await.unwrap();

        // then (期待する結果):
        assert_eq!(message.body.as_str().chars().count(), 500);
        let stored = hub.repository.recent(1).await.unwrap();
        assert_eq!(stored[0].body.as_str().chars().count(), 500);
    }

    #[tokio::test]
    async fn test_rename_does_not_rewrite_past_authors() {
        // テスト項目: 名前変更後も過去のメッセージの作者名は変わらない
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = create_usecase(&hub);
        let (alice, _rx) = register(&hub).await;
        hub.registry
            .rename(&alice, DisplayName::normalize("alice"))
            .await
            .unwrap();
        usecase.execute(&alice, "before").await.unwrap();

        // when (操作):
        hub.registry
            .rename(&alice, DisplayName::normalize("alicia"))
            .await
            .unwrap();
        usecase.execute(&alice, "after").await.unwrap();

        // then (期待する結果):
        let stored = hub.repository.recent(10).await.unwrap();
        assert_eq!(stored[0].author.as_str(), "alice");
        assert_eq!(stored[1].author.as_str(), "alicia");
    }

    #[tokio::test]
    async fn test_send_from_unregistered_sender() {
        // テスト項目: 未登録の接続からの送信はエラーで、保存されない
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = create_usecase(&hub);
        let ghost = ConnectionIdFactory::generate();

        // when (操作):
        let result = usecase.execute(&ghost, "hello").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::SenderNotFound(ghost.to_string()))
        );
        assert!(hub.repository.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_persistence_failure() {
        // テスト項目: 永続化失敗はエラーとして返り、接続は登録されたまま
        // given (前提条件):
        let hub = create_test_hub().await;
        let mut repository = MockMessageRepository::new();
        repository
            .expect_append()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Persistence("disk full".to_string())));
        let usecase = SendMessageUseCase::new(
            hub.registry.clone(),
            Arc::new(repository),
            hub.message_pusher.clone(),
        );
        let (alice, mut rx) = register(&hub).await;

        // when (操作):
        let result = usecase.execute(&alice, "hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendMessageError::Persistence(_))));
        assert!(hub.registry.find(&alice).await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_message_reaches_everyone() {
        // テスト項目: 送信者を含む全員にブロードキャストされる
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = create_usecase(&hub);
        let (_alice, mut rx1) = register(&hub).await;
        let (_bob, mut rx2) = register(&hub).await;

        // when (操作):
        let report = usecase.broadcast_message("chat").await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert_eq!(rx1.recv().await, Some("chat".to_string()));
        assert_eq!(rx2.recv().await, Some("chat".to_string()));
    }
}
