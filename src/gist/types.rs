use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One named text blob inside a gist. When `truncated` is set the inline
/// `content` may be incomplete and `raw_url` points at the full content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub language: Option<String>,
    pub raw_url: String,
    pub size: u64,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistOwner {
    pub login: String,
    pub id: u64,
}

/// A gist as the upstream API reports it. This is what document reads return
/// to the caller, so it carries only public fields; transport metadata like
/// rate-limit headers travels separately in [`FetchedGist`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    pub url: String,
    pub files: HashMap<String, GistFile>,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub description: Option<String>,
    pub comments: u64,
    pub owner: GistOwner,
}

/// Error body the GitHub API returns alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub struct GitHubApiError {
    pub message: String,
    pub documentation_url: Option<String>,
}

/// Quota headers the upstream attaches to responses. Only these names are
/// forwarded; absent headers are omitted rather than defaulted.
pub const RATE_LIMIT_HEADERS: [&str; 5] = [
    "X-RateLimit-Limit",
    "X-RateLimit-Remaining",
    "X-RateLimit-Reset",
    "X-RateLimit-Used",
    "X-RateLimit-Resource",
];

#[derive(Debug, Clone, Default)]
pub struct RateLimitInfo {
    pub headers: Vec<(&'static str, String)>,
}

impl RateLimitInfo {
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let headers = RATE_LIMIT_HEADERS
            .iter()
            .filter_map(|&name| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| (name, v.to_string()))
            })
            .collect();
        Self { headers }
    }
}

/// Transport result of a document read: the gist plus the quota metadata
/// captured from the same response.
#[derive(Debug, Clone)]
pub struct FetchedGist {
    pub gist: Gist,
    pub rate_limit: RateLimitInfo,
}

/// Transport result of a file read.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub content: String,
    pub rate_limit: RateLimitInfo,
}
