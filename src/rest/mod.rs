// rest/mod.rs — HTTP/JSON surface of the aggregation service.
//
// Axum server, CORS restricted to the configured dashboard origins.
//
// Endpoints:
//   GET    /api/git/health
//   GET    /api/git/worktrees
//   GET    /api/git/branches
//   DELETE /api/git/branches/{branchName}
//   POST   /api/git/cleanup-branches
//   GET    /api/git/worktree-commits/{worktreePath}
//   POST   /api/git/execute
//
// Error bodies are always shaped `{error, details?}`.

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::AppContext;

pub async fn start_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("repository status API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let cors = cors_layer(&ctx.config.cors_origins);

    Router::new()
        .route("/api/git/health", get(routes::health::health))
        .route("/api/git/worktrees", get(routes::worktrees::list))
        .route("/api/git/branches", get(routes::branches::list))
        .route(
            "/api/git/branches/{branchName}",
            delete(routes::branches::delete_one),
        )
        .route(
            "/api/git/cleanup-branches",
            post(routes::branches::cleanup),
        )
        .route(
            "/api/git/worktree-commits/{worktreePath}",
            get(routes::commits::list),
        )
        .route("/api/git/execute", post(routes::execute::execute))
        .layer(cors)
        .with_state(ctx)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "invalid CORS origin — skipping");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

// ─── Error bodies ────────────────────────────────────────────────────────────

pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn error_body(
    status: StatusCode,
    error: &str,
    details: Option<String>,
) -> ApiError {
    let body = match details {
        Some(details) => json!({ "error": error, "details": details }),
        None => json!({ "error": error }),
    };
    (status, Json(body))
}

/// Whole-request failure: the primary git call failed.
pub(crate) fn internal_error(error: &str, e: impl std::fmt::Display) -> ApiError {
    error_body(StatusCode::INTERNAL_SERVER_ERROR, error, Some(e.to_string()))
}
