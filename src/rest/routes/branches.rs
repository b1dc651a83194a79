use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::git::branches::{cleanup_branches, delete_branch, list_branches, DeleteError};
use crate::observability::LatencyTracker;
use crate::rest::{error_body, internal_error, ApiError};
use crate::AppContext;

pub async fn list(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    let tracker = LatencyTracker::start("branches.list");
    match list_branches(&ctx.git, &ctx.config.repo_path).await {
        Ok(overview) => {
            tracker.finish();
            Ok(Json(json!({
                "branches": overview.branches,
                "remoteBranches": overview.remote_branches,
                "currentBranch": overview.current_branch,
            })))
        }
        Err(e) => Err(internal_error("Failed to list branches", e)),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub force: bool,
}

/// The request body is optional — an absent or empty body means no force.
pub async fn delete_one(
    State(ctx): State<Arc<AppContext>>,
    Path(branch_name): Path<String>,
    body: axum::body::Bytes,
) -> Result<Json<Value>, ApiError> {
    let force = if body.is_empty() {
        false
    } else {
        match serde_json::from_slice::<DeleteRequest>(&body) {
            Ok(req) => req.force,
            Err(e) => {
                return Err(error_body(
                    StatusCode::BAD_REQUEST,
                    "Invalid request body",
                    Some(e.to_string()),
                ))
            }
        }
    };

    match delete_branch(&ctx.git, &ctx.config.repo_path, &branch_name, force).await {
        Ok(output) => Ok(Json(json!({
            "success": true,
            "message": format!("Branch '{branch_name}' deleted"),
            "output": output,
        }))),
        Err(DeleteError::Protected(name)) => Err(error_body(
            StatusCode::BAD_REQUEST,
            "Cannot delete protected branch",
            Some(format!("'{name}' is protected")),
        )),
        Err(DeleteError::NotFound(name)) => Err(error_body(
            StatusCode::NOT_FOUND,
            "Branch not found",
            Some(format!("no local branch named '{name}'")),
        )),
        Err(DeleteError::NotFullyMerged(name)) => Err(error_body(
            StatusCode::BAD_REQUEST,
            "Branch is not fully merged",
            Some(format!(
                "'{name}' has unmerged commits — retry with force: true to delete anyway"
            )),
        )),
        Err(DeleteError::Git(e)) => Err(internal_error("Failed to delete branch", e)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    pub branches: Vec<String>,
    #[serde(default)]
    pub dry_run: bool,
}

pub async fn cleanup(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CleanupRequest>,
) -> Json<Value> {
    let tracker = LatencyTracker::start("branches.cleanup");
    let report = cleanup_branches(
        &ctx.git,
        &ctx.config.repo_path,
        &body.branches,
        body.dry_run,
    )
    .await;
    tracker.finish();
    Json(json!(report))
}
