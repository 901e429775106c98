//! Client for the upstream gist API.
//!
//! One client is built per request from the resolved credentials. All four
//! operations go through `/gists/{id}`; mutations are PATCH requests naming
//! only the affected file. Non-success responses are classified into the
//! fixed error taxonomy here. The raw upstream body is logged, never
//! forwarded.

use reqwest::header;
use reqwest::Method;
use serde_json::{json, Value};

use crate::auth::ResolvedCredentials;
use crate::errors::AppError;
use crate::gist::types::{FetchedGist, FileContent, Gist, GitHubApiError, RateLimitInfo};

const USER_AGENT: &str = "gist-gateway";
const API_VERSION: &str = "2022-11-28";

pub struct GistClient {
    http: reqwest::Client,
    base_url: String,
    creds: ResolvedCredentials,
}

impl GistClient {
    pub fn new(http: reqwest::Client, base_url: &str, creds: ResolvedCredentials) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            creds,
        }
    }

    fn gist_url(&self) -> String {
        format!("{}/gists/{}", self.base_url, self.creds.gist_id)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.creds.github_token),
            )
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .header(header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Fetch the whole gist, capturing quota headers from the response.
    pub async fn fetch_gist(&self) -> Result<FetchedGist, AppError> {
        let resp = self.request(Method::GET, &self.gist_url()).send().await?;
        if !resp.status().is_success() {
            return Err(self.classify(resp).await);
        }
        let rate_limit = RateLimitInfo::from_headers(resp.headers());
        let gist: Gist = resp.json().await?;
        Ok(FetchedGist { gist, rate_limit })
    }

    /// Fetch one file's full content. Truncated entries are re-fetched from
    /// their `raw_url` without credentials.
    pub async fn fetch_file(&self, filename: &str) -> Result<FileContent, AppError> {
        let fetched = self.fetch_gist().await?;
        let file = fetched
            .gist
            .files
            .get(filename)
            .ok_or(AppError::FileNotFound)?;

        if file.truncated && !file.raw_url.is_empty() {
            let content = self.fetch_raw(&file.raw_url).await?;
            return Ok(FileContent {
                content,
                rate_limit: fetched.rate_limit,
            });
        }

        Ok(FileContent {
            content: file.content.clone(),
            rate_limit: fetched.rate_limit,
        })
    }

    /// Update-or-create: upstream PATCH semantics create the file if absent,
    /// so no existence pre-check is made.
    pub async fn update_file(&self, filename: &str, content: &str) -> Result<(), AppError> {
        self.patch_files(filename, Some(content)).await
    }

    /// Create a file, failing if it already exists. Read-then-write with no
    /// transactional guarantee; the upstream remains the source of truth for
    /// concurrent writers.
    pub async fn create_file(&self, filename: &str, content: &str) -> Result<(), AppError> {
        let fetched = self.fetch_gist().await?;
        if fetched.gist.files.contains_key(filename) {
            return Err(AppError::FileAlreadyExists);
        }
        self.patch_files(filename, Some(content)).await
    }

    /// Delete a file, failing if it does not exist.
    pub async fn delete_file(&self, filename: &str) -> Result<(), AppError> {
        let fetched = self.fetch_gist().await?;
        if !fetched.gist.files.contains_key(filename) {
            return Err(AppError::FileNotFound);
        }
        self.patch_files(filename, None).await
    }

    async fn fetch_raw(&self, raw_url: &str) -> Result<String, AppError> {
        let resp = self
            .http
            .get(raw_url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("raw content fetch failed: {}", e);
                AppError::ContentFetchFailed
            })?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "raw content fetch returned non-success");
            return Err(AppError::ContentFetchFailed);
        }
        resp.text().await.map_err(|e| {
            tracing::warn!("raw content read failed: {}", e);
            AppError::ContentFetchFailed
        })
    }

    /// PATCH `/gists/{id}` naming one file. `None` content is the upstream
    /// delete sentinel.
    async fn patch_files(&self, filename: &str, content: Option<&str>) -> Result<(), AppError> {
        let entry = match content {
            Some(content) => json!({ "content": content }),
            None => Value::Null,
        };
        let mut files = serde_json::Map::new();
        files.insert(filename.to_string(), entry);
        let body = json!({ "files": files });

        let resp = self
            .request(Method::PATCH, &self.gist_url())
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(self.classify(resp).await);
        }
        Ok(())
    }

    /// Turn a non-success upstream response into an error tag. The parsed
    /// body is logged in full; the caller only ever sees the tag's fixed
    /// message.
    async fn classify(&self, resp: reqwest::Response) -> AppError {
        let status = resp.status();
        match resp.json::<GitHubApiError>().await {
            Ok(body) => {
                tracing::error!(
                    status = %status,
                    gist_id = %self.creds.gist_id,
                    message = %body.message,
                    documentation_url = body.documentation_url.as_deref().unwrap_or(""),
                    "GitHub API error"
                );
                match status.as_u16() {
                    404 => AppError::GistNotFound,
                    401 => AppError::UpstreamAuthFailed,
                    403 => AppError::UpstreamRateLimited,
                    _ => AppError::UpstreamGeneric,
                }
            }
            Err(_) => {
                tracing::error!(status = %status, gist_id = %self.creds.gist_id, "GitHub API error with unparseable body");
                AppError::UpstreamStatus(status.as_u16())
            }
        }
    }
}
