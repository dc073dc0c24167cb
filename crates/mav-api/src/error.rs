use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Request failures, rendered as `{"error": "..."}`.
///
/// `Server` carries the message shown to the client; log the underlying cause
/// before constructing it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("server error: {0}")]
    Server(String),
}

pub const INTERNAL_ERROR: &str = "Internal server error";

impl ApiError {
    pub fn internal() -> Self {
        Self::Server(INTERNAL_ERROR.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unauthenticated(m) | Self::Forbidden(m) => *m,
            Self::BadRequest(m) | Self::Server(m) => m.as_str(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
