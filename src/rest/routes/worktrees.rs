use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::git::worktrees::list_worktrees;
use crate::observability::LatencyTracker;
use crate::rest::{internal_error, ApiError};
use crate::AppContext;

pub async fn list(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    let tracker = LatencyTracker::start("worktrees.list");
    match list_worktrees(&ctx.git, &ctx.config.repo_path).await {
        Ok(worktrees) => {
            tracker.finish();
            Ok(Json(json!({ "worktrees": worktrees })))
        }
        Err(e) => Err(internal_error("Failed to list worktrees", e)),
    }
}
