//! Repository 実装
//!
//! - `inmemory`: 接続レジストリ（Hub）
//! - `sqlite`: メッセージストア

pub mod inmemory;
pub mod sqlite;

pub use inmemory::{ConnectionTable, InMemoryParticipantRegistry, SharedConnectionTable};
pub use sqlite::SqliteMessageRepository;
