//! Entities

use super::value_object::{ConnectionId, DisplayName, MessageBody, MessageId, Timestamp};

/// 接続中の参加者
///
/// レジストリ（Hub）が生存期間中に排他的に所有する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ConnectionId,
    pub name: DisplayName,
    pub joined_at: Timestamp,
}

impl Participant {
    /// デフォルト名（"Guest"）で参加者を作成
    pub fn new(id: ConnectionId, joined_at: Timestamp) -> Self {
        Self {
            id,
            name: DisplayName::default(),
            joined_at,
        }
    }
}

/// 永続化済みのチャットメッセージ（生成後は不変）
///
/// `author` は送信時点の表示名のスナップショット。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author: DisplayName,
    pub body: MessageBody,
    pub timestamp: Timestamp,
}

/// ある一瞬のレジストリの状態
///
/// `participants` は参加時刻の昇順（同時刻は登録順）。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrySnapshot {
    pub participants: Vec<Participant>,
    pub count: usize,
}

impl RegistrySnapshot {
    pub fn new(participants: Vec<Participant>) -> Self {
        let count = participants.len();
        Self {
            participants,
            count,
        }
    }
}

/// 名前変更の結果（変更前 → 変更後）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameChange {
    pub old: DisplayName,
    pub new: DisplayName,
}
