//! Worktree listing with best-effort per-worktree enrichment.
//!
//! The primary `git worktree list --porcelain` call is the only one allowed
//! to fail the request. The three follow-up calls per worktree (last commit,
//! uncommitted count, ahead/behind) each degrade to a default on failure, so
//! a broken worktree still ships with its structural fields intact.

use std::path::Path;

use futures_util::future::join_all;
use tracing::debug;

use super::exec::GitRunner;
use super::model::{needs_attention, LastCommit, WorktreeInfo};
use super::parse::{
    count_status_lines, parse_ahead_behind, parse_last_commit, parse_worktree_list, Parse,
    WorktreeRecord,
};

/// List all worktrees of `repo` with enrichment.
///
/// Result order matches `git worktree list` output order.
pub async fn list_worktrees(git: &GitRunner, repo: &Path) -> Result<Vec<WorktreeInfo>, super::GitError> {
    let out = git.run(repo, &["worktree", "list", "--porcelain"]).await?;

    let records: Vec<WorktreeRecord> = parse_worktree_list(&out.stdout)
        .into_iter()
        .filter_map(|entry| match entry {
            Parse::Parsed(record) => Some(record),
            Parse::Malformed { input, reason } => {
                debug!(reason, input, "skipping worktree entry");
                None
            }
        })
        .collect();

    Ok(join_all(records.into_iter().map(|r| enrich(git, r))).await)
}

async fn enrich(git: &GitRunner, record: WorktreeRecord) -> WorktreeInfo {
    let (last_commit, uncommitted_changes, (ahead, behind)) = tokio::join!(
        last_commit(git, &record.path),
        uncommitted_count(git, &record.path),
        ahead_behind(git, &record.path),
    );

    WorktreeInfo {
        path: record.path.to_string_lossy().into_owned(),
        commit: record.commit,
        branch: record.branch,
        last_commit,
        uncommitted_changes,
        ahead,
        behind,
        needs_attention: needs_attention(uncommitted_changes, ahead, behind),
    }
}

async fn last_commit(git: &GitRunner, dir: &Path) -> Option<LastCommit> {
    match git.run(dir, &["log", "-1", "--format=%h|%s|%ar|%an"]).await {
        Ok(out) => match parse_last_commit(out.stdout.trim()) {
            Parse::Parsed(record) => Some(LastCommit {
                hash: record.hash,
                message: record.message,
                relative_time: record.relative_time,
                author: record.author,
            }),
            Parse::Malformed { input, reason } => {
                debug!(dir = %dir.display(), reason, input, "unparseable last-commit line");
                None
            }
        },
        Err(e) => {
            debug!(dir = %dir.display(), err = %e, "last-commit lookup failed");
            None
        }
    }
}

async fn uncommitted_count(git: &GitRunner, dir: &Path) -> u64 {
    match git.run(dir, &["status", "--porcelain"]).await {
        Ok(out) => count_status_lines(&out.stdout),
        Err(e) => {
            debug!(dir = %dir.display(), err = %e, "status lookup failed — defaulting to 0");
            0
        }
    }
}

/// Ahead/behind relative to the upstream ref. A missing upstream is the
/// common case for local-only branches and simply counts as (0, 0).
async fn ahead_behind(git: &GitRunner, dir: &Path) -> (u64, u64) {
    match git
        .run(dir, &["rev-list", "--left-right", "--count", "HEAD...@{u}"])
        .await
    {
        Ok(out) => parse_ahead_behind(&out.stdout).ok().unwrap_or((0, 0)),
        Err(_) => (0, 0),
    }
}
