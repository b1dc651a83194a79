use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::git::commits::worktree_commits;
use crate::rest::{internal_error, ApiError};
use crate::AppContext;

#[derive(Debug, Default, Deserialize)]
pub struct CommitsQuery {
    pub limit: Option<usize>,
}

/// The worktree path arrives percent-encoded as a single path segment;
/// axum decodes it before it reaches the handler.
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Path(worktree_path): Path<String>,
    Query(query): Query<CommitsQuery>,
) -> Result<Json<Value>, ApiError> {
    let path = PathBuf::from(worktree_path);
    match worktree_commits(&ctx.git, &path, query.limit).await {
        Ok(history) => Ok(Json(json!(history))),
        Err(e) => Err(internal_error("Failed to read worktree commits", e)),
    }
}
