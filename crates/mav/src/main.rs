use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use mav_api::{middleware::auth::TokenVerifier, AppState};
use mav_core::{authz::AllowList, config::Config};
use mav_supabase::SupabaseClient;
use mav_telegram::{webhook::register_webhook, TelegramMessenger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mav_core::logging::init("mav")?;

    let cfg = Config::load()?;
    info!(?cfg, "configuration loaded");

    let supabase = Arc::new(SupabaseClient::new(
        &cfg.supabase_url,
        cfg.supabase_service_key.clone(),
        cfg.backend_timeout,
    )?);
    let messenger = TelegramMessenger::from_token(cfg.telegram_bot_token.clone());

    if let Some(url) = &cfg.telegram_webhook_url {
        if let Err(e) = register_webhook(
            &messenger.bot(),
            url,
            cfg.telegram_webhook_secret.as_deref(),
        )
        .await
        {
            warn!(error = %e, "webhook registration failed; continuing");
        }
    }

    let verifier = TokenVerifier::from_secret(cfg.jwt_secret.as_bytes(), cfg.jwt_audience.as_deref());
    let state = AppState::new(supabase.clone(), supabase, Arc::new(messenger), verifier)
        .with_notify_allowed(AllowList::new(&cfg.notify_allowed_positions))
        .with_webhook_secret(cfg.telegram_webhook_secret.clone());

    mav_api::serve(state, cfg.bind_addr)
        .await
        .context("http server failed")?;

    Ok(())
}
