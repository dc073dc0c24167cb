use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of an authenticated caller (the token `sub` claim).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// The authenticated actor, built per request from verified token claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CallerIdentity {
    pub id: UserId,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Organizational rank. `level` is a monotonic seniority ordinal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub name: String,
    pub level: i32,
}

impl Position {
    pub fn new(name: impl Into<String>, level: i32) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

/// A Telegram chat opted in to receive agency notifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredChat {
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub is_active: bool,
    pub registered_at: DateTime<Utc>,
}
