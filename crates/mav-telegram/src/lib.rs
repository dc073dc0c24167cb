//! Telegram adapter (teloxide).
//!
//! This crate implements the `mav-core` MessagingPort over the Telegram Bot API
//! and registers the bot's webhook.

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

pub mod webhook;

use mav_core::{
    domain::ChatId,
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(Bot::new(token))
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_markdown(&self, chat_id: ChatId, text: &str) -> Result<()> {
        // Legacy Markdown keeps escaping to `_ * ` [` for user-provided text.
        #[allow(deprecated)]
        let parse_mode = ParseMode::Markdown;

        self.bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .parse_mode(parse_mode)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}
