//! InMemory Participant Registry 実装
//!
//! ドメイン層が定義する ParticipantRegistry trait の具体的な実装。
//! HashMap をインメモリのレジストリとして使用します。
//!
//! ## 排他制御
//!
//! 参加者レコードと送信チャンネルは 1 つの `ConnectionTable` にまとめ、
//! 1 つの `Mutex` で保護します。`WebSocketMessagePusher` も同じテーブルを
//! 共有するため、登録・削除・名前変更・スナップショット・ブロードキャストの
//! 走査は全て同じ排他区間で直列化されます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio::sync::Mutex;
use veranda_shared::time::Clock;

use crate::domain::{
    ConnectionId, DisplayName, NameChange, Participant, ParticipantRegistry, PusherChannel,
    RegistryError, RegistrySnapshot, Timestamp,
};

/// レジストリとプッシャーが共有するテーブル
pub type SharedConnectionTable = Arc<Mutex<ConnectionTable>>;

/// 登録中の接続 1 件分
pub(crate) struct ConnectionEntry {
    pub(crate) participant: Participant,
    /// 登録順（同時刻参加のタイブレーク用）
    pub(crate) seq: u64,
    pub(crate) channel: PusherChannel,
}

/// 接続中の参加者と送信チャンネルの表
#[derive(Default)]
pub struct ConnectionTable {
    pub(crate) entries: HashMap<ConnectionId, ConnectionEntry>,
    next_seq: u64,
    last_joined_at: i64,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しいテーブルを共有可能な形で作成
    pub fn shared() -> SharedConnectionTable {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 参加時刻が登録順に対して単調増加になるよう補正する
    fn next_join_timestamp(&mut self, now: i64) -> Timestamp {
        let joined_at = now.max(self.last_joined_at);
        self.last_joined_at = joined_at;
        Timestamp::new(joined_at)
    }

    /// 重複確認済みの接続を追加する
    fn insert(&mut self, id: ConnectionId, channel: PusherChannel, now: i64) -> Participant {
        let joined_at = self.next_join_timestamp(now);
        let participant = Participant::new(id, joined_at);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            id,
            ConnectionEntry {
                participant: participant.clone(),
                seq,
                channel,
            },
        );

        tracing::debug!("Connection '{}' registered (total={})", id, self.len());
        participant
    }

    pub(crate) fn remove(&mut self, id: &ConnectionId) -> Option<Participant> {
        self.entries.remove(id).map(|entry| entry.participant)
    }
}

/// インメモリ Participant Registry 実装
pub struct InMemoryParticipantRegistry {
    table: SharedConnectionTable,
    clock: Arc<dyn Clock>,
}

impl InMemoryParticipantRegistry {
    /// 新しい InMemoryParticipantRegistry を作成
    ///
    /// # 引数
    ///
    /// - `table`: `WebSocketMessagePusher` と共有する接続テーブル
    /// - `clock`: 参加時刻の取得元
    pub fn new(table: SharedConnectionTable, clock: Arc<dyn Clock>) -> Self {
        Self { table, clock }
    }
}

#[async_trait]
impl ParticipantRegistry for InMemoryParticipantRegistry {
    async fn register(
        &self,
        id: ConnectionId,
        channel: PusherChannel,
    ) -> Result<Participant, RegistryError> {
        let mut table = self.table.lock().await;
        if table.entries.contains_key(&id) {
            return Err(RegistryError::DuplicateConnection(id.to_string()));
        }
        Ok(table.insert(id, channel, self.clock.now_millis()))
    }

    async fn register_with_greeting(
        &self,
        id: ConnectionId,
        channel: PusherChannel,
        greeting: BoxFuture<'static, String>,
    ) -> Result<Participant, RegistryError> {
        let mut table = self.table.lock().await;
        if table.entries.contains_key(&id) {
            return Err(RegistryError::DuplicateConnection(id.to_string()));
        }

        let frame = greeting.await;
        channel
            .send(frame)
            .map_err(|_| RegistryError::ChannelClosed(id.to_string()))?;
        Ok(table.insert(id, channel, self.clock.now_millis()))
    }

    async fn deregister(&self, id: &ConnectionId) -> Option<Participant> {
        let mut table = self.table.lock().await;
        let removed = table.remove(id);
        if removed.is_some() {
            tracing::debug!("Connection '{}' deregistered (total={})", id, table.len());
        }
        removed
    }

    async fn rename(
        &self,
        id: &ConnectionId,
        name: DisplayName,
    ) -> Result<NameChange, RegistryError> {
        let mut table = self.table.lock().await;
        let entry = table
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::ConnectionNotFound(id.to_string()))?;

        let old = std::mem::replace(&mut entry.participant.name, name.clone());
        Ok(NameChange { old, new: name })
    }

    async fn find(&self, id: &ConnectionId) -> Option<Participant> {
        let table = self.table.lock().await;
        table.entries.get(id).map(|entry| entry.participant.clone())
    }

    async fn snapshot(&self) -> RegistrySnapshot {
        let table = self.table.lock().await;
        let mut entries: Vec<&ConnectionEntry> = table.entries.values().collect();
        entries.sort_by_key(|entry| (entry.participant.joined_at, entry.seq));

        RegistrySnapshot::new(
            entries
                .into_iter()
                .map(|entry| entry.participant.clone())
                .collect(),
        )
    }
}
