//! Per-request credential resolution.
//!
//! Precedence, first match wins:
//! 1. Verified token claims carry the GitHub token; gist id comes from the
//!    URL if present, else from the claims.
//! 2. Shared-secret callers fall back to the process-wide GitHub token and
//!    gist id from configuration; a URL gist id still overrides the latter.

use crate::auth::AuthContext;
use crate::config::Config;
use crate::errors::AppError;

/// The concrete upstream pair a request will use. Request-scoped, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub github_token: String,
    pub gist_id: String,
}

pub fn resolve(
    auth: &AuthContext,
    url_gist_id: Option<&str>,
    config: &Config,
) -> Result<ResolvedCredentials, AppError> {
    if let Some(claims) = &auth.claims {
        let gist_id = url_gist_id
            .map(String::from)
            .or_else(|| claims.gist_id.clone())
            .ok_or(AppError::MissingGistId)?;
        return Ok(ResolvedCredentials {
            github_token: claims.github_token.clone(),
            gist_id,
        });
    }

    // Shared-secret path: necessarily scoped to the configured pair.
    let (Some(github_token), Some(gist_id)) = (&config.github_token, &config.gist_id) else {
        return Err(AppError::CredentialsNotConfigured);
    };
    Ok(ResolvedCredentials {
        github_token: github_token.clone(),
        gist_id: url_gist_id.map(String::from).unwrap_or_else(|| gist_id.clone()),
    })
}
