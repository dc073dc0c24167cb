use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use mav_core::notifications::{BroadcastReport, DealNotification};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub success: bool,
    pub delivered: usize,
    pub failed: usize,
}

/// `POST /api/notifications/deal` (allow-listed positions)
///
/// Sends to every active chat in turn; a failed chat does not stop the rest.
pub async fn post_deal(
    State(state): State<AppState>,
    payload: Result<Json<DealNotification>, JsonRejection>,
) -> Result<Json<BroadcastResponse>, ApiError> {
    let Json(deal) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected deal notification body");
        ApiError::BadRequest(rejection.body_text())
    })?;

    let chats = state.chats.list_active().await.map_err(|e| {
        error!(error = %e, "failed to list active chats");
        ApiError::internal()
    })?;

    let text = deal.to_markdown();
    let mut report = BroadcastReport::default();
    for chat in &chats {
        match state.messenger.send_markdown(chat.chat_id, &text).await {
            Ok(_) => report.delivered += 1,
            Err(e) => {
                warn!(chat_id = chat.chat_id.0, error = %e, "deal notification not delivered");
                report.failed += 1;
            }
        }
    }

    info!(
        delivered = report.delivered,
        failed = report.failed,
        "deal notification broadcast"
    );

    Ok(Json(BroadcastResponse {
        success: true,
        delivered: report.delivered,
        failed: report.failed,
    }))
}
