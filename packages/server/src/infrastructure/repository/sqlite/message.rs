//! SQLite Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//!
//! ## テーブル
//!
//! ```text
//! messages(id INTEGER PRIMARY KEY AUTOINCREMENT, ts_ms INTEGER, nick TEXT, text TEXT)
//! ```
//!
//! `id` の昇順が挿入順。`synchronous = FULL` のため、`append` が返った時点で
//! コミットはディスクに到達している。

use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use sqlx::{
    Row,
    sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
        SqliteSynchronous,
    },
};
use veranda_shared::time::Clock;

use crate::domain::{
    ChatMessage, DisplayName, MessageBody, MessageId, MessageRepository, RepositoryError,
    Timestamp,
};

const CREATE_MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS messages(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts_ms INTEGER NOT NULL,
    nick TEXT NOT NULL,
    text TEXT NOT NULL
)
"#;

const FILE_POOL_MAX_CONNECTIONS: u32 = 5;

fn persistence_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Persistence(e.to_string())
}

/// SQLite Message Repository 実装
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteMessageRepository {
    /// 既存のプールから作成し、テーブルを用意する
    pub async fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        sqlx::query(CREATE_MESSAGES_TABLE)
            .execute(&pool)
            .await
            .map_err(persistence_error)?;
        Ok(Self { pool, clock })
    }

    /// データベースファイルを開く（なければ作成）
    pub async fn open(path: &Path, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full);

        let pool = SqlitePoolOptions::new()
            .max_connections(FILE_POOL_MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(persistence_error)?;

        tracing::info!("Opened message store at {}", path.display());
        Self::new(pool, clock).await
    }

    /// インメモリ DB で作成（テスト用）
    ///
    /// `sqlite::memory:` は接続ごとに別の DB になるため、接続は 1 本に固定する。
    pub async fn in_memory(clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .map_err(persistence_error)?;
        Self::new(pool, clock).await
    }

    /// 行をドメインモデルに変換する。不正な行は `None`。
    ///
    /// 空白のみの本文は SQL 側で除外済み（`recent` の件数に数えない）。
    /// ここに来るのは ASCII 以外の空白だけの本文など、SQL の `trim` で
    /// 落とせなかった行のみ。ほかのツールが書いた長すぎる名前・本文は
    /// 切り詰めて返し、その旨をログに残す。
    fn row_to_message(row: &SqliteRow) -> Result<Option<ChatMessage>, RepositoryError> {
        let id: i64 = row.try_get("id").map_err(persistence_error)?;
        let ts_ms: i64 = row.try_get("ts_ms").map_err(persistence_error)?;
        let nick: String = row.try_get("nick").map_err(persistence_error)?;
        let text: String = row.try_get("text").map_err(persistence_error)?;

        let Ok(body) = MessageBody::parse(&text) else {
            tracing::warn!("Skipping stored message {} with empty body", id);
            return Ok(None);
        };
        let author = DisplayName::normalize(&nick);

        if body.as_str() != text {
            tracing::warn!(
                "Stored message {} body normalized ({} -> {} chars)",
                id,
                text.chars().count(),
                body.as_str().chars().count()
            );
        }
        if author.as_str() != nick {
            tracing::warn!("Stored message {} author normalized to '{}'", id, author);
        }

        Ok(Some(ChatMessage {
            id: MessageId::new(id),
            author,
            body,
            timestamp: Timestamp::new(ts_ms),
        }))
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn append(
        &self,
        author: DisplayName,
        body: MessageBody,
    ) -> Result<ChatMessage, RepositoryError> {
        let timestamp = Timestamp::new(self.clock.now_millis());

        let result = sqlx::query("INSERT INTO messages(ts_ms, nick, text) VALUES(?, ?, ?)")
            .bind(timestamp.value())
            .bind(author.as_str())
            .bind(body.as_str())
            .execute(&self.pool)
            .await
            .map_err(persistence_error)?;

        Ok(ChatMessage {
            id: MessageId::new(result.last_insert_rowid()),
            author,
            body,
            timestamp,
        })
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, RepositoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT id, ts_ms, nick, text FROM (
                SELECT id, ts_ms, nick, text FROM messages
                WHERE trim(text, ' ' || char(9) || char(10) || char(11) || char(12) || char(13)) <> ''
                ORDER BY id DESC LIMIT ?
            ) ORDER BY id ASC
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(message) = Self::row_to_message(row)? {
                messages.push(message);
            }
        }
        Ok(messages)
    }
}
