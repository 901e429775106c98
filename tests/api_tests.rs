//! End-to-end tests: full router, real middleware stack, mock GitHub API.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gist_gateway::auth::token;
use gist_gateway::config::Config;
use gist_gateway::{api, AppState};

const SECRET: &str = "test-signing-secret";

fn base_config(api_url: &str) -> Config {
    Config {
        port: 0,
        jwt_secret: Some(SECRET.into()),
        bearer_token: None,
        github_token: None,
        gist_id: None,
        github_api_url: api_url.into(),
    }
}

fn app(config: Config) -> axum::Router {
    api::router(Arc::new(AppState::new(config)))
}

/// Token scoped to gist `abc123`, carrying its own GitHub credential.
fn signed_token() -> String {
    token::issue("ghp_caller", Some("abc123"), SECRET, Duration::hours(1)).unwrap()
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("Authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn with_body(method: &str, uri: &str, auth: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", auth)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn gist_json(files: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": "abc123",
        "url": "https://api.github.com/gists/abc123",
        "files": files,
        "public": false,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-06-01T12:30:00Z",
        "description": "scratch pad",
        "comments": 0,
        "owner": { "login": "octocat", "id": 1 }
    })
}

fn file_json(name: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "filename": name,
        "type": "text/plain",
        "language": null,
        "raw_url": format!("https://gist.githubusercontent.com/raw/{name}"),
        "size": content.len(),
        "truncated": false,
        "content": content
    })
}

// ── Authentication gate ──────────────────────────────────────

#[tokio::test]
async fn missing_auth_header_is_401() {
    let app = app(base_config("http://unused.invalid"));
    let (status, _, body) = send(&app, get("/api/gist", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Missing authorization header");
}

#[tokio::test]
async fn non_bearer_header_is_401() {
    let app = app(base_config("http://unused.invalid"));
    let (status, _, body) = send(&app, get("/api/gist", Some("Basic xyz"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Invalid authorization header format");
}

#[tokio::test]
async fn bad_token_without_fallback_is_401() {
    let app = app(base_config("http://unused.invalid"));
    let (status, _, body) = send(&app, get("/api/gist", Some("Bearer not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Invalid or expired token");
}

#[tokio::test]
async fn expired_token_is_401() {
    let app = app(base_config("http://unused.invalid"));
    let stale = token::issue("ghp_caller", Some("abc123"), SECRET, Duration::seconds(-10)).unwrap();
    let (status, _, body) = send(&app, get("/api/gist", Some(&format!("Bearer {stale}")))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Invalid or expired token");
}

#[tokio::test]
async fn bad_token_falls_back_to_shared_secret() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/env-gist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({}))))
        .mount(&server)
        .await;

    let mut config = base_config(&server.uri());
    config.bearer_token = Some("legacy-secret".into());
    config.github_token = Some("ghp_env".into());
    config.gist_id = Some("env-gist".into());

    let app = app(config);
    let (status, _, _) = send(&app, get("/api/gist", Some("Bearer legacy-secret"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_shared_secret_is_401() {
    let mut config = base_config("http://unused.invalid");
    config.jwt_secret = None;
    config.bearer_token = Some("legacy-secret".into());

    let app = app(config);
    let (status, _, body) = send(&app, get("/api/gist", Some("Bearer wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Invalid bearer token");
}

#[tokio::test]
async fn no_auth_configured_is_500() {
    let mut config = base_config("http://unused.invalid");
    config.jwt_secret = None;
    config.bearer_token = None;

    let app = app(config);
    let (status, _, body) = send(&app, get("/api/gist", Some("Bearer anything"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Authentication not configured");
}

#[tokio::test]
async fn compound_bearer_header_uses_the_jwt_part() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({}))))
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer opaque-routing-token:{}", signed_token());
    let (status, _, _) = send(&app, get("/api/gist", Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
}

// ── Document and file reads ──────────────────────────────────

#[tokio::test]
async fn gist_read_returns_json_and_echoes_quota_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gist_json(serde_json::json!({
                    "notes.txt": file_json("notes.txt", "hello")
                })))
                .insert_header("X-RateLimit-Limit", "5000")
                .insert_header("X-RateLimit-Remaining", "4999"),
        )
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer {}", signed_token());
    let (status, headers, body) = send(&app, get("/api/gist", Some(&auth))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["X-RateLimit-Limit"], "5000");
    assert_eq!(headers["X-RateLimit-Remaining"], "4999");

    let gist: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(gist["id"], "abc123");
    assert_eq!(gist["files"]["notes.txt"]["content"], "hello");
}

#[tokio::test]
async fn file_read_returns_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({
            "notes.txt": file_json("notes.txt", "hello")
        }))))
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(&app, get("/api/gist/file/notes.txt", Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello");
}

#[tokio::test]
async fn url_gist_id_overrides_token_scope() {
    let server = MockServer::start().await;
    let mut other = gist_json(serde_json::json!({}));
    other["id"] = serde_json::json!("other456");
    Mock::given(method("GET"))
        .and(path("/gists/other456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(other))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(&app, get("/api/gist/other456", Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    let gist: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(gist["id"], "other456");
}

#[tokio::test]
async fn missing_file_is_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({}))))
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(&app, get("/api/gist/file/ghost.txt", Some(&auth))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "File not found");
}

#[tokio::test]
async fn upstream_404_is_gist_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(&app, get("/api/gist", Some(&auth))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Gist not found");
}

#[tokio::test]
async fn invalid_filename_is_rejected_before_any_upstream_call() {
    // No mock server: a request reaching upstream would error differently.
    let app = app(base_config("http://unused.invalid"));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(&app, get("/api/gist/file/bad..name", Some(&auth))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid filename");
}

// ── Mutations ────────────────────────────────────────────────

#[tokio::test]
async fn put_updates_file() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .and(body_partial_json(serde_json::json!({
            "files": { "notes.txt": { "content": "new text" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(
        &app,
        with_body("PUT", "/api/gist/file/notes.txt", &auth, "new text"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "File updated successfully");
}

#[tokio::test]
async fn put_with_empty_body_is_400() {
    let app = app(base_config("http://unused.invalid"));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(
        &app,
        with_body("PUT", "/api/gist/file/notes.txt", &auth, ""),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Request body is required");
}

#[tokio::test]
async fn post_creates_new_file_with_201() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({}))))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(
        &app,
        with_body("POST", "/api/gist/file/x.txt", &auth, "fresh"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, "File created successfully");
}

#[tokio::test]
async fn post_existing_file_is_400() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({
            "x.txt": file_json("x.txt", "already here")
        }))))
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(
        &app,
        with_body("POST", "/api/gist/file/x.txt", &auth, "fresh"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "File already exists");
}

#[tokio::test]
async fn delete_removes_existing_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({
            "notes.txt": file_json("notes.txt", "bye")
        }))))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .and(body_partial_json(serde_json::json!({
            "files": { "notes.txt": null }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_json(serde_json::json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(base_config(&server.uri()));
    let auth = format!("Bearer {}", signed_token());
    let (status, _, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/api/gist/file/notes.txt")
            .header("Authorization", auth)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "File deleted successfully");
}

// ── Shared-secret scoping ────────────────────────────────────

#[tokio::test]
async fn shared_secret_without_configured_credentials_is_500() {
    let mut config = base_config("http://unused.invalid");
    config.jwt_secret = None;
    config.bearer_token = Some("legacy-secret".into());
    // No github_token / gist_id fallbacks configured.

    let app = app(config);
    let (status, _, body) = send(&app, get("/api/gist", Some("Bearer legacy-secret"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "GitHub credentials not configured");
}

#[tokio::test]
async fn token_without_gist_id_and_no_url_id_is_500() {
    let app = app(base_config("http://unused.invalid"));
    let unscoped = token::issue("ghp_caller", None, SECRET, Duration::hours(1)).unwrap();
    let (status, _, body) = send(&app, get("/api/gist", Some(&format!("Bearer {unscoped}")))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Gist ID not provided");
}

// ── Ambient response headers ─────────────────────────────────

#[tokio::test]
async fn banner_is_public_and_carries_security_headers() {
    let app = app(base_config("http://unused.invalid"));
    let (status, headers, body) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "GitHub Gist API - Use /api/gist endpoints");
    assert_eq!(headers["X-Content-Type-Options"], "nosniff");
    assert_eq!(headers["X-Frame-Options"], "DENY");
    assert_eq!(headers["X-XSS-Protection"], "1; mode=block");
    assert_eq!(headers["Strict-Transport-Security"], "max-age=31536000");
}

#[tokio::test]
async fn rejections_carry_security_headers_too() {
    let app = app(base_config("http://unused.invalid"));
    let (status, headers, _) = send(&app, get("/api/gist", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers["X-Content-Type-Options"], "nosniff");
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let app = app(base_config("http://unused.invalid"));
    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header("Origin", "https://app.example")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["access-control-allow-origin"], "*");
}
