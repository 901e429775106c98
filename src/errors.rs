use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Every failure the gateway can surface. Each variant maps to exactly one
/// HTTP status and one caller-facing message; detailed upstream error bodies
/// are logged at the classification site and never reach the caller.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Authentication ───────────────────────────────────────
    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    MalformedAuthHeader,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Invalid bearer token")]
    InvalidSharedSecret,

    #[error("Authentication not configured")]
    AuthNotConfigured,

    // ── Credential resolution ────────────────────────────────
    #[error("Gist ID not provided")]
    MissingGistId,

    #[error("GitHub credentials not configured")]
    CredentialsNotConfigured,

    // ── Request validation ───────────────────────────────────
    #[error("Invalid filename")]
    InvalidFilename,

    #[error("Request body is required")]
    EmptyBody,

    // ── Gist operations ──────────────────────────────────────
    #[error("File not found")]
    FileNotFound,

    #[error("File already exists")]
    FileAlreadyExists,

    #[error("Failed to fetch file content")]
    ContentFetchFailed,

    // ── Upstream classification ──────────────────────────────
    #[error("Gist not found")]
    GistNotFound,

    #[error("GitHub authentication failed")]
    UpstreamAuthFailed,

    #[error("GitHub API rate limit exceeded")]
    UpstreamRateLimited,

    #[error("GitHub API error")]
    UpstreamGeneric,

    #[error("GitHub API error: {0}")]
    UpstreamStatus(u16),

    #[error("Upstream request failed")]
    Network(#[from] reqwest::Error),
}

impl AppError {
    /// Fixed per-variant status lookup. Status is derived from the tag,
    /// never from message content.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingAuthHeader
            | AppError::MalformedAuthHeader
            | AppError::InvalidOrExpiredToken
            | AppError::InvalidSharedSecret => StatusCode::UNAUTHORIZED,

            AppError::InvalidFilename | AppError::EmptyBody | AppError::FileAlreadyExists => {
                StatusCode::BAD_REQUEST
            }

            AppError::FileNotFound | AppError::GistNotFound => StatusCode::NOT_FOUND,

            AppError::AuthNotConfigured
            | AppError::MissingGistId
            | AppError::CredentialsNotConfigured
            | AppError::ContentFetchFailed
            | AppError::UpstreamAuthFailed
            | AppError::UpstreamRateLimited
            | AppError::UpstreamGeneric
            | AppError::UpstreamStatus(_)
            | AppError::Network(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Network(ref e) = self {
            tracing::error!("upstream request failed: {}", e);
        }
        (self.status(), self.to_string()).into_response()
    }
}
