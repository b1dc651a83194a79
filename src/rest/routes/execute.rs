//! Pre-approved command execution.
//!
//! The whitelist is the system's only authorization control, so matching is
//! exact: the trimmed command must equal a whitelist entry verbatim.
//! Anything else (including a whitelisted command with extra arguments
//! appended) is rejected. The matched command is split into argv and run
//! without any shell.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::rest::{error_body, internal_error, ApiError};
use crate::AppContext;

/// The five commands the dashboard is allowed to run.
pub const ALLOWED_COMMANDS: &[&str] = &[
    "git status",
    "git branch",
    "git log --oneline -10",
    "git remote -v",
    "git worktree list",
];

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub command: String,
}

pub async fn execute(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<ExecuteRequest>,
) -> Result<Json<Value>, ApiError> {
    let command = body.command.trim();

    if !ALLOWED_COMMANDS.contains(&command) {
        warn!(command, "rejected non-whitelisted command");
        return Err(error_body(
            StatusCode::FORBIDDEN,
            "Command not allowed",
            Some(format!("allowed commands: {}", ALLOWED_COMMANDS.join(", "))),
        ));
    }

    // Whitelisted commands are all `git <args...>`; strip the leading token
    // and hand the rest to the runner as argv.
    let args: Vec<&str> = command.split_whitespace().skip(1).collect();

    info!(command, "executing whitelisted command");
    match ctx.git.run(&ctx.config.repo_path, &args).await {
        Ok(out) => Ok(Json(json!({ "output": out.stdout }))),
        Err(e) => Err(internal_error("Command failed", e)),
    }
}
