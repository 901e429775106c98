//! Authentication gate for the `/api` surface.
//!
//! Two ways in: a signed token (verified, claims attached to the request),
//! or a static shared secret compared in constant time. Token verification
//! falls back to the shared secret only when one is configured; otherwise a
//! bad token is rejected outright.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::AppState;

pub mod filename;
pub mod resolver;
pub mod token;

pub use filename::is_valid_filename;
pub use resolver::{resolve, ResolvedCredentials};
pub use token::TokenClaims;

/// What authentication established about a request. Inserted into request
/// extensions on success and read back by credential resolution. `claims`
/// is `None` on the shared-secret path.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Option<TokenClaims>,
}

/// Middleware guarding every `/api` route.
pub async fn gate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(header) = header else {
        return Err(AppError::MissingAuthHeader);
    };
    let Some(bearer) = token::extract_bearer(header) else {
        return Err(AppError::MalformedAuthHeader);
    };

    if let Some(secret) = &state.config.jwt_secret {
        match token::verify(bearer, secret) {
            Ok(claims) => {
                req.extensions_mut().insert(AuthContext { claims: Some(claims) });
                return Ok(next.run(req).await);
            }
            Err(_) if state.config.bearer_token.is_none() => {
                return Err(AppError::InvalidOrExpiredToken);
            }
            // Bad token but a shared secret exists: give the legacy path a go.
            Err(_) => {}
        }
    }

    if let Some(expected) = &state.config.bearer_token {
        if bool::from(bearer.as_bytes().ct_eq(expected.as_bytes())) {
            req.extensions_mut().insert(AuthContext { claims: None });
            return Ok(next.run(req).await);
        }
        return Err(AppError::InvalidSharedSecret);
    }

    Err(AppError::AuthNotConfigured)
}
