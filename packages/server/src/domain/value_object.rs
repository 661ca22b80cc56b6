//! Value Objects
//!
//! 不変条件（名前の長さ・本文の長さ等）は生成時に保証する。
//! 文字数は `char`（Unicode スカラー値）単位で数える。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// 表示名の最大文字数
pub const DISPLAY_NAME_MAX_CHARS: usize = 24;

/// 表示名のデフォルト値
pub const DEFAULT_DISPLAY_NAME: &str = "Guest";

/// メッセージ本文の最大文字数
pub const MESSAGE_BODY_MAX_CHARS: usize = 500;

/// 接続ハンドル
///
/// 接続ごとに UUID v4 を払い出す。接続が切れても再利用されない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// ConnectionId の生成器
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// 新しい ConnectionId を生成
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4())
    }
}

/// 参加者の表示名
///
/// 常に空でなく、前後の空白を含まず、24 文字以内。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// 任意の入力を表示名に正規化する
    ///
    /// トリム → 24 文字に切り詰め → 再トリム。結果が空なら "Guest"。
    pub fn normalize(raw: &str) -> Self {
        let truncated: String = raw.trim().chars().take(DISPLAY_NAME_MAX_CHARS).collect();
        let trimmed = truncated.trim_end();
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for DisplayName {
    fn default() -> Self {
        Self(DEFAULT_DISPLAY_NAME.to_string())
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メッセージ本文
///
/// トリム済み・空でない・500 文字以内。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    /// 入力をトリム → 500 文字に切り詰め → 再トリム。空なら拒否。
    ///
    /// 先頭は空白でないため、再トリム後も空にはならない。
    pub fn parse(raw: &str) -> Result<Self, ValueObjectError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyMessageBody);
        }
        let truncated: String = trimmed.chars().take(MESSAGE_BODY_MAX_CHARS).collect();
        Ok(Self(truncated.trim_end().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// ストアが払い出すメッセージ ID（挿入順と一致する）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
