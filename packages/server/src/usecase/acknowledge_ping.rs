//! UseCase: 生存確認への応答

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher};

/// 生存確認（ping）に送信者だけへ応答するユースケース
pub struct AcknowledgePingUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl AcknowledgePingUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 応答を送信者にだけ送る（ブロードキャストしない）
    pub async fn execute(
        &self,
        id: &ConnectionId,
        pong_json: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(id, pong_json).await
    }
}
