use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use tracing::error;

use mav_core::domain::{CallerIdentity, Position, UserId};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: UserId,
    pub email: Option<String>,
    pub role: Option<String>,
    pub position: Option<Position>,
}

#[derive(Debug, Serialize)]
pub struct AgentPositionResponse {
    pub agent_id: String,
    pub position: Option<Position>,
}

async fn position_of(state: &AppState, user_id: &UserId) -> Result<Option<Position>, ApiError> {
    state.positions.position_for(user_id).await.map_err(|e| {
        error!(user_id = %user_id, error = %e, "position lookup failed");
        ApiError::internal()
    })
}

/// `GET /api/me`
pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<MeResponse>, ApiError> {
    let position = position_of(&state, &caller.id).await?;
    Ok(Json(MeResponse {
        id: caller.id,
        email: caller.email,
        role: caller.role,
        position,
    }))
}

/// `GET /api/agents/{agent_id}/position` (elevated or self)
pub async fn agent_position(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentPositionResponse>, ApiError> {
    let position = position_of(&state, &UserId(agent_id.clone())).await?;
    Ok(Json(AgentPositionResponse { agent_id, position }))
}
