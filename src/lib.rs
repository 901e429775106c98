//! gist-gateway: bearer-token gateway for reading and writing files inside
//! a GitHub gist.
//!
//! Callers authenticate with a signed token (carrying their own GitHub
//! credential) or a static shared secret; the gateway resolves which gist and
//! which upstream credential each request uses, performs one gist operation,
//! and re-shapes upstream failures into a fixed set of status codes.

use std::time::Duration;

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod gist;

/// Shared application state passed to handlers and middleware. Immutable for
/// the life of the process; the HTTP client is internally pooled and cheap to
/// clone per request.
pub struct AppState {
    pub config: config::Config,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build HTTP client");
        Self { config, http }
    }
}
