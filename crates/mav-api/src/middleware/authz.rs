//! Position-gated authorization.
//!
//! Must run after [`authenticate`](super::auth::authenticate). Apply with
//! `route_layer` so path parameters are available to the elevated/self gate.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{error, info};

use mav_core::{
    authz::{check_allow_list, check_elevated_or_self, is_self_access, AllowList, Decision},
    domain::{CallerIdentity, Position},
    store::PositionStore,
};

use crate::{error::ApiError, middleware::auth::NO_TOKEN};

/// Allow-list gate: the caller's position name must be listed.
#[derive(Clone)]
pub struct RequirePositions {
    pub positions: Arc<dyn PositionStore>,
    pub allowed: AllowList,
}

/// Elevated/self gate keyed by a path parameter holding the target user id.
#[derive(Clone)]
pub struct RequireElevatedOrSelf {
    pub positions: Arc<dyn PositionStore>,
    pub param: &'static str,
}

fn caller(req: &Request) -> Result<CallerIdentity, ApiError> {
    req.extensions()
        .get::<CallerIdentity>()
        .cloned()
        .ok_or(ApiError::Unauthenticated(NO_TOKEN))
}

/// Backend failures are server errors, never a denial.
async fn lookup_position(
    positions: &dyn PositionStore,
    caller: &CallerIdentity,
) -> Result<Option<Position>, ApiError> {
    positions.position_for(&caller.id).await.map_err(|e| {
        error!(user_id = %caller.id, error = %e, "position lookup failed");
        ApiError::internal()
    })
}

fn enforce(decision: Decision, caller: &CallerIdentity) -> Result<(), ApiError> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            info!(user_id = %caller.id, reason = reason.message(), "access denied");
            Err(ApiError::Forbidden(reason.message()))
        }
    }
}

pub async fn require_positions(
    State(gate): State<RequirePositions>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = caller(&req)?;
    let position = lookup_position(gate.positions.as_ref(), &caller).await?;
    enforce(check_allow_list(position.as_ref(), &gate.allowed), &caller)?;
    Ok(next.run(req).await)
}

pub async fn require_elevated_or_self(
    State(gate): State<RequireElevatedOrSelf>,
    Path(params): Path<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = caller(&req)?;
    let target = params.get(gate.param).map(String::as_str).unwrap_or("");

    if is_self_access(&caller.id, target) {
        return Ok(next.run(req).await);
    }

    let position = lookup_position(gate.positions.as_ref(), &caller).await?;
    enforce(
        check_elevated_or_self(&caller.id, target, position.as_ref()),
        &caller,
    )?;
    Ok(next.run(req).await)
}
