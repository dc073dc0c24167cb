use reqwest::Url;
use teloxide::{prelude::*, types::AllowedUpdate};
use tracing::info;

use mav_core::{errors::Error, Result};

/// Update kinds the webhook dispatcher understands.
pub fn allowed_updates() -> Vec<AllowedUpdate> {
    vec![AllowedUpdate::Message, AllowedUpdate::MyChatMember]
}

/// Point the bot's webhook at `url`, optionally with a secret token Telegram
/// echoes back in `X-Telegram-Bot-Api-Secret-Token`.
pub async fn register_webhook(bot: &Bot, url: &str, secret: Option<&str>) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|e| Error::Config(format!("invalid TELEGRAM_WEBHOOK_URL {url:?}: {e}")))?;

    let mut req = bot.set_webhook(parsed).allowed_updates(allowed_updates());
    if let Some(secret) = secret {
        req = req.secret_token(secret.to_string());
    }
    req.await
        .map_err(|e| Error::External(format!("telegram setWebhook failed: {e}")))?;

    info!(url, "telegram webhook registered");
    Ok(())
}
