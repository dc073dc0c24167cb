//! Bearer-token authentication.
//!
//! Verifies the Supabase-issued JWT from the `Authorization` header and
//! inserts the resulting [`CallerIdentity`] into request extensions for
//! downstream middleware and handlers.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

use mav_core::domain::{CallerIdentity, UserId};

use crate::error::ApiError;

pub const NO_TOKEN: &str = "No token provided";
pub const INVALID_FORMAT: &str = "Invalid token format";
pub const INVALID_TOKEN: &str = "Invalid token";

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// HS256 verifier for tokens signed with the project's JWT secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Expiry is always checked. Audience is checked only when configured.
    pub fn from_secret(secret: &[u8], audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<CallerIdentity, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(CallerIdentity {
            id: UserId(data.claims.sub),
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(ApiError::Unauthenticated(NO_TOKEN))?;
    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthenticated(INVALID_FORMAT))?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(ApiError::Unauthenticated(INVALID_FORMAT))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(ApiError::Unauthenticated(INVALID_FORMAT));
    }
    Ok(token)
}

/// Axum middleware that authenticates requests with a bearer JWT.
pub async fn authenticate(
    State(verifier): State<Arc<TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;

    let caller = verifier.verify(token).map_err(|e| {
        debug!(error = %e, "token verification failed");
        ApiError::Unauthenticated(INVALID_TOKEN)
    })?;

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}
