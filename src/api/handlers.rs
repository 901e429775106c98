//! Route handlers for the gist surface.
//!
//! Every route exists twice: once resolving the gist id from the token or
//! configuration, and once with an explicit `:gist_id` path segment that
//! overrides both. Filename and body validation happen before credential
//! resolution and before any network call.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use crate::auth::{self, AuthContext};
use crate::errors::AppError;
use crate::gist::{GistClient, RateLimitInfo};
use crate::AppState;

pub async fn index() -> &'static str {
    "GitHub Gist API - Use /api/gist endpoints"
}

fn client_for(
    state: &AppState,
    auth: &AuthContext,
    url_gist_id: Option<&str>,
) -> Result<GistClient, AppError> {
    let creds = auth::resolve(auth, url_gist_id, &state.config)?;
    Ok(GistClient::new(
        state.http.clone(),
        &state.config.github_api_url,
        creds,
    ))
}

fn echo_rate_limit(info: &RateLimitInfo) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &info.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

// ── Document reads ───────────────────────────────────────────

async fn get_gist_inner(
    state: &AppState,
    auth: &AuthContext,
    url_gist_id: Option<&str>,
) -> Result<Response, AppError> {
    let fetched = client_for(state, auth, url_gist_id)?.fetch_gist().await?;
    Ok((echo_rate_limit(&fetched.rate_limit), Json(fetched.gist)).into_response())
}

pub async fn get_gist(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Response, AppError> {
    get_gist_inner(&state, &auth, None).await
}

pub async fn get_gist_by_id(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(gist_id): Path<String>,
) -> Result<Response, AppError> {
    get_gist_inner(&state, &auth, Some(&gist_id)).await
}

// ── File reads ───────────────────────────────────────────────

async fn get_file_inner(
    state: &AppState,
    auth: &AuthContext,
    url_gist_id: Option<&str>,
    filename: &str,
) -> Result<Response, AppError> {
    if !auth::is_valid_filename(filename) {
        return Err(AppError::InvalidFilename);
    }
    let file = client_for(state, auth, url_gist_id)?.fetch_file(filename).await?;
    Ok((echo_rate_limit(&file.rate_limit), file.content).into_response())
}

pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    get_file_inner(&state, &auth, None, &filename).await
}

pub async fn get_file_scoped(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path((gist_id, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    get_file_inner(&state, &auth, Some(&gist_id), &filename).await
}

// ── File writes ──────────────────────────────────────────────

async fn update_file_inner(
    state: &AppState,
    auth: &AuthContext,
    url_gist_id: Option<&str>,
    filename: &str,
    body: &str,
) -> Result<Response, AppError> {
    if !auth::is_valid_filename(filename) {
        return Err(AppError::InvalidFilename);
    }
    if body.is_empty() {
        return Err(AppError::EmptyBody);
    }
    client_for(state, auth, url_gist_id)?.update_file(filename, body).await?;
    Ok("File updated successfully".into_response())
}

pub async fn update_file(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(filename): Path<String>,
    body: String,
) -> Result<Response, AppError> {
    update_file_inner(&state, &auth, None, &filename, &body).await
}

pub async fn update_file_scoped(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path((gist_id, filename)): Path<(String, String)>,
    body: String,
) -> Result<Response, AppError> {
    update_file_inner(&state, &auth, Some(&gist_id), &filename, &body).await
}

async fn create_file_inner(
    state: &AppState,
    auth: &AuthContext,
    url_gist_id: Option<&str>,
    filename: &str,
    body: &str,
) -> Result<Response, AppError> {
    if !auth::is_valid_filename(filename) {
        return Err(AppError::InvalidFilename);
    }
    if body.is_empty() {
        return Err(AppError::EmptyBody);
    }
    client_for(state, auth, url_gist_id)?.create_file(filename, body).await?;
    Ok((StatusCode::CREATED, "File created successfully").into_response())
}

pub async fn create_file(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(filename): Path<String>,
    body: String,
) -> Result<Response, AppError> {
    create_file_inner(&state, &auth, None, &filename, &body).await
}

pub async fn create_file_scoped(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path((gist_id, filename)): Path<(String, String)>,
    body: String,
) -> Result<Response, AppError> {
    create_file_inner(&state, &auth, Some(&gist_id), &filename, &body).await
}

// ── File deletes ─────────────────────────────────────────────

async fn delete_file_inner(
    state: &AppState,
    auth: &AuthContext,
    url_gist_id: Option<&str>,
    filename: &str,
) -> Result<Response, AppError> {
    if !auth::is_valid_filename(filename) {
        return Err(AppError::InvalidFilename);
    }
    client_for(state, auth, url_gist_id)?.delete_file(filename).await?;
    Ok("File deleted successfully".into_response())
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    delete_file_inner(&state, &auth, None, &filename).await
}

pub async fn delete_file_scoped(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path((gist_id, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    delete_file_inner(&state, &auth, Some(&gist_id), &filename).await
}
