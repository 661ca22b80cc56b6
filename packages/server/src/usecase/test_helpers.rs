use std::sync::Arc;

use veranda_shared::time::FixedClock;

use crate::{
    domain::{MessageRepository, MessagePusher, ParticipantRegistry},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{ConnectionTable, InMemoryParticipantRegistry, SqliteMessageRepository},
    },
};

/// ユースケースのテスト用に組み立てた Hub 一式
pub(crate) struct TestHub {
    pub registry: Arc<dyn ParticipantRegistry>,
    pub repository: Arc<dyn MessageRepository>,
    pub message_pusher: Arc<dyn MessagePusher>,
}

/// インメモリ SQLite と共有接続テーブルで Hub を組み立てる
pub(crate) async fn create_test_hub() -> TestHub {
    let clock = Arc::new(FixedClock::new(1_700_000_000_000));
    let table = ConnectionTable::shared();
    TestHub {
        registry: Arc::new(InMemoryParticipantRegistry::new(table.clone(), clock.clone())),
        repository: Arc::new(
            SqliteMessageRepository::in_memory(clock)
                .await
                .expect("Failed to create in-memory repository"),
        ),
        message_pusher: Arc::new(WebSocketMessagePusher::new(table)),
    }
}
