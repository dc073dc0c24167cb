use async_trait::async_trait;

use crate::{
    domain::{ChatId, Position, RegisteredChat, UserId},
    Result,
};

/// Lookup of a caller's organizational position.
///
/// `Ok(None)` means "no position assigned"; `Err` means the backend could not
/// answer. Authorization relies on that distinction.
#[async_trait]
pub trait PositionStore: Send + Sync {
    async fn position_for(&self, user_id: &UserId) -> Result<Option<Position>>;
}

/// Persistence for Telegram chats that receive notifications.
#[async_trait]
pub trait ChatRegistry: Send + Sync {
    /// Insert or update the chat as active. Never creates a duplicate row.
    async fn register(&self, chat_id: ChatId, title: Option<&str>) -> Result<()>;

    /// Mark the chat inactive. Unknown chats are not an error.
    async fn unregister(&self, chat_id: ChatId) -> Result<()>;

    async fn get(&self, chat_id: ChatId) -> Result<Option<RegisteredChat>>;

    async fn list_active(&self) -> Result<Vec<RegisteredChat>>;
}
