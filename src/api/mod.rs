use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{auth, AppState};

pub mod handlers;

/// Build the full application router. Everything under `/api` sits behind
/// the authentication gate; the root banner does not.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/gist", get(handlers::get_gist))
        .route("/gist/:gist_id", get(handlers::get_gist_by_id))
        .route(
            "/gist/file/:filename",
            get(handlers::get_file)
                .put(handlers::update_file)
                .post(handlers::create_file)
                .delete(handlers::delete_file),
        )
        .route(
            "/gist/:gist_id/file/:filename",
            get(handlers::get_file_scoped)
                .put(handlers::update_file_scoped)
                .post(handlers::create_file_scoped)
                .delete(handlers::delete_file_scoped),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::gate));

    Router::new()
        .route("/", get(handlers::index))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::PUT,
                    Method::POST,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                ])
                .max_age(Duration::from_secs(86400)),
        )
        .layer(middleware::from_fn(security_headers_middleware))
        .with_state(state)
}

/// Applies fixed security headers to every response, success or failure.
async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("X-XSS-Protection", HeaderValue::from_static("1; mode=block"));
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000"),
    );

    resp
}
