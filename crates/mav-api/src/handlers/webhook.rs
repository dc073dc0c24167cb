use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};

use mav_core::webhook::Update;

use crate::{error::ApiError, state::AppState};

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";
pub const INVALID_SECRET: &str = "Invalid webhook secret";

fn secret_matches(headers: &HeaderMap, expected: &str) -> bool {
    let Some(got) = headers.get(SECRET_HEADER) else {
        return false;
    };
    got.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// `POST /api/telegram/webhook`
///
/// Telegram only needs an acknowledgement; reply delivery problems are logged
/// by the dispatcher and never surface here.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if let Some(expected) = state.webhook_secret.as_deref() {
        if !secret_matches(&headers, expected) {
            warn!("webhook call with missing or wrong secret token");
            return Err(ApiError::Unauthenticated(INVALID_SECRET));
        }
    }

    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "failed to parse telegram update");
        ApiError::Server(e.to_string())
    })?;

    let outcome = state.dispatcher.dispatch(&update).await;
    debug!(update_id = ?update.update_id, ?outcome, "telegram update handled");

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn secret_must_match_exactly() {
        let mut h = HeaderMap::new();
        assert!(!secret_matches(&h, "s3cret"));
        h.insert(SECRET_HEADER, HeaderValue::from_static("s3cret"));
        assert!(secret_matches(&h, "s3cret"));
        assert!(!secret_matches(&h, "s3cret2"));
        assert!(!secret_matches(&h, "other"));
    }
}
