use async_trait::async_trait;

use crate::{
    domain::ChatId,
    Result,
};

/// Outbound messaging port.
///
/// Telegram is the only implementation; text is sent with the messenger's
/// lightweight markup mode (Telegram legacy Markdown).
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_markdown(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
