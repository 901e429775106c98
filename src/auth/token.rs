//! Signed bearer-token codec.
//!
//! Tokens are HS256 JWTs whose claims carry the upstream GitHub token and an
//! optional gist id. Claim names are camelCase so tokens minted by older
//! tooling keep verifying.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// GitHub token to use upstream on behalf of this caller.
    pub github_token: String,
    /// Gist this caller is scoped to. A gist id in the URL overrides it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gist_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a new token. `ttl` is added to the current time to form `exp`.
/// Signing-primitive failure is unexpected and left to the caller to treat
/// as fatal.
pub fn issue(
    github_token: &str,
    gist_id: Option<&str>,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = Utc::now().timestamp();
    let claims = TokenClaims {
        github_token: github_token.to_string(),
        gist_id: gist_id.map(String::from),
        iat,
        exp: iat + ttl.num_seconds(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token end to end: signature, structure, and expiry. There is no
/// partial success: any defect yields `InvalidOrExpiredToken`.
pub fn verify(token: &str, secret: &str) -> Result<TokenClaims, AppError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidOrExpiredToken)
}

/// Pull the bearer token out of an Authorization header value.
///
/// The scheme is case-sensitive `Bearer` followed by whitespace. When the
/// remainder contains exactly one colon it is read as `<apiToken>:<jwt>`
/// (an opaque routing token travelling alongside the verifiable credential)
/// and only the part after the colon is returned. Any other colon count
/// returns the remainder unmodified.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let rest = header.strip_prefix("Bearer")?;
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let token = rest.trim_start();
    if token.is_empty() {
        return None;
    }
    match token.matches(':').count() {
        1 => token.split_once(':').map(|(_, jwt)| jwt),
        _ => Some(token),
    }
}
