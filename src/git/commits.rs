//! Commit history for a single worktree.
//!
//! The hash listing is the primary call; per-commit metadata and the full
//! message body (for the `Task: #<uuid>` trailer) are fetched concurrently
//! per hash, best-effort. A commit whose follow-ups fail is substituted
//! with a placeholder record rather than failing the request.

use std::path::Path;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::debug;

use super::exec::{GitError, GitRunner};
use super::model::CommitDetail;
use super::parse::{extract_task_id, parse_last_commit};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorktreeCommits {
    pub worktree_path: String,
    /// Checked-out branch, empty when detached or unavailable.
    pub branch: String,
    pub commits: Vec<CommitDetail>,
    pub total_commits: usize,
}

/// List the most recent commits of the worktree at `path`, newest first
/// (git log's native order).
pub async fn worktree_commits(
    git: &GitRunner,
    path: &Path,
    limit: Option<usize>,
) -> Result<WorktreeCommits, GitError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let limit_arg = limit.to_string();

    let out = git
        .run(path, &["log", "--format=%H", "-n", &limit_arg])
        .await?;
    let hashes: Vec<String> = out
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    let branch = match git.run(path, &["branch", "--show-current"]).await {
        Ok(out) => out.stdout.trim().to_string(),
        Err(e) => {
            debug!(path = %path.display(), err = %e, "current-branch lookup failed");
            String::new()
        }
    };

    let commits = join_all(hashes.iter().map(|h| commit_detail(git, path, h))).await;
    let total_commits = commits.len();

    Ok(WorktreeCommits {
        worktree_path: path.to_string_lossy().into_owned(),
        branch,
        commits,
        total_commits,
    })
}

async fn commit_detail(git: &GitRunner, path: &Path, hash: &str) -> CommitDetail {
    let meta_args = ["log", "-1", "--format=%h|%s|%ar|%an", hash];
    let body_args = ["log", "-1", "--format=%B", hash];
    let (meta, body) = tokio::join!(
        git.run(path, &meta_args),
        git.run(path, &body_args),
    );

    let parsed = match meta {
        Ok(out) => parse_last_commit(out.stdout.trim()).ok(),
        Err(e) => {
            debug!(hash, err = %e, "commit metadata lookup failed");
            None
        }
    };

    match parsed {
        Some(record) => CommitDetail {
            hash: hash.to_string(),
            short_hash: Some(record.hash),
            message: record.message,
            relative_time: Some(record.relative_time),
            author: Some(record.author),
            task_id: body.ok().and_then(|out| extract_task_id(&out.stdout)),
        },
        None => CommitDetail::retrieval_error(hash),
    }
}
