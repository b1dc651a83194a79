//! Branch listing, deletion, and bulk cleanup.
//!
//! Listing joins three independent primary calls (all refs, current branch,
//! merged set) by branch name, then enriches local branches best-effort.
//! Deletion and cleanup mutate refs and therefore run sequentially.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::exec::{GitError, GitRunner};
use super::model::{
    can_delete, suggest_cleanup, BranchCommit, BranchInfo, DELETE_PROTECTED,
};
use super::parse::{
    is_head_pointer, parse_ahead_behind, parse_merged_set, parse_ref_line, Parse, RefRecord,
    REF_LINE_FORMAT,
};

/// Everything the branch listing endpoint returns.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchOverview {
    pub branches: Vec<BranchInfo>,
    pub remote_branches: Vec<BranchInfo>,
    pub current_branch: String,
}

/// List local and remote branches with merge state and local enrichment.
pub async fn list_branches(git: &GitRunner, repo: &Path) -> Result<BranchOverview, GitError> {
    let format_arg = format!("--format={REF_LINE_FORMAT}");
    let refs_args = ["for-each-ref", "refs/heads", "refs/remotes", &format_arg];
    let current_args = ["branch", "--show-current"];
    let merged_args = ["branch", "--merged", "--format=%(refname:short)"];
    let (refs_out, current_out, merged_out) = tokio::join!(
        git.run(repo, &refs_args),
        git.run(repo, &current_args),
        git.run(repo, &merged_args),
    );

    let refs_out = refs_out?;
    let current_branch = current_out?.stdout.trim().to_string();
    let merged = parse_merged_set(&merged_out?.stdout);

    let records: Vec<RefRecord> = refs_out
        .stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_ref_line)
        .filter_map(|entry| match entry {
            Parse::Parsed(record) => Some(record),
            Parse::Malformed { input, reason } => {
                debug!(reason, input, "skipping branch entry");
                None
            }
        })
        .filter(|record| !is_head_pointer(record))
        .collect();

    let (remote, local): (Vec<_>, Vec<_>) = records.into_iter().partition(|r| r.is_remote);

    let branches = join_all(
        local
            .into_iter()
            .map(|r| enrich_local(git, repo, r, &current_branch, &merged)),
    )
    .await;

    let remote_branches = remote
        .into_iter()
        .map(|r| base_info(r, &current_branch, &merged))
        .collect();

    Ok(BranchOverview {
        branches,
        remote_branches,
        current_branch,
    })
}

fn base_info(record: RefRecord, current: &str, merged: &HashSet<String>) -> BranchInfo {
    BranchInfo {
        is_current: !record.is_remote && record.name == current,
        is_merged: merged.contains(&record.name),
        last_commit: BranchCommit {
            date: record.date.to_rfc3339(),
            author: record.author,
            message: record.message,
        },
        name: record.name,
        full_name: record.full_name,
        is_remote: record.is_remote,
        has_upstream: None,
        ahead: None,
        behind: None,
        age_in_days: None,
        can_delete: None,
        suggest_cleanup: None,
    }
}

/// Local-branch enrichment: upstream probe, ahead/behind, age, and the two
/// cleanup predicates. Each probe degrades individually on failure.
async fn enrich_local(
    git: &GitRunner,
    repo: &Path,
    record: RefRecord,
    current: &str,
    merged: &HashSet<String>,
) -> BranchInfo {
    let age_in_days = Utc::now()
        .signed_duration_since(record.date.with_timezone(&Utc))
        .num_days();

    let upstream_ref = format!("{}@{{upstream}}", record.name);
    let has_upstream = git
        .run(repo, &["rev-parse", "--abbrev-ref", &upstream_ref])
        .await
        .is_ok();

    let range = format!("{0}...{0}@{{u}}", record.name);
    let (ahead, behind) = match git
        .run(repo, &["rev-list", "--left-right", "--count", &range])
        .await
    {
        Ok(out) => parse_ahead_behind(&out.stdout).ok().unwrap_or((0, 0)),
        Err(_) => (0, 0),
    };

    let mut info = base_info(record, current, merged);
    info.has_upstream = Some(has_upstream);
    info.ahead = Some(ahead);
    info.behind = Some(behind);
    info.age_in_days = Some(age_in_days);
    info.can_delete = Some(can_delete(info.is_merged, info.is_current, &info.name));
    info.suggest_cleanup = Some(suggest_cleanup(info.is_merged, age_in_days));
    info
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("cannot delete protected branch '{0}'")]
    Protected(String),
    #[error("branch '{0}' not found")]
    NotFound(String),
    #[error("branch '{0}' is not fully merged")]
    NotFullyMerged(String),
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Delete a local branch. `force` switches `-d` to `-D`.
///
/// Returns git's stdout on success. The "not fully merged" classification is
/// a stderr substring match — the only signal `git branch -d` offers.
pub async fn delete_branch(
    git: &GitRunner,
    repo: &Path,
    name: &str,
    force: bool,
) -> Result<String, DeleteError> {
    if DELETE_PROTECTED.contains(&name) {
        return Err(DeleteError::Protected(name.to_string()));
    }

    let verify_ref = format!("refs/heads/{name}");
    if git
        .run(repo, &["show-ref", "--verify", "--quiet", &verify_ref])
        .await
        .is_err()
    {
        return Err(DeleteError::NotFound(name.to_string()));
    }

    let flag = if force { "-D" } else { "-d" };
    match git.run(repo, &["branch", flag, "--", name]).await {
        Ok(out) => {
            info!(branch = name, force, "branch deleted");
            Ok(out.stdout.trim().to_string())
        }
        Err(e) if e.stderr().contains("not fully merged") => {
            Err(DeleteError::NotFullyMerged(name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

// ─── Bulk cleanup ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupStatus {
    Skipped,
    WouldDelete,
    Deleted,
    Error,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub branch: String,
    pub status: CleanupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSummary {
    pub total: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub results: Vec<CleanupResult>,
    pub summary: CleanupSummary,
    pub dry_run: bool,
}

/// Delete (or, in dry-run mode, merely report) a batch of branches.
///
/// Branches are processed sequentially — deletions mutate refs, so the
/// listing-style fan-out does not apply. A failure on one branch never
/// aborts the batch.
pub async fn cleanup_branches(
    git: &GitRunner,
    repo: &Path,
    branches: &[String],
    dry_run: bool,
) -> CleanupReport {
    let mut results = Vec::with_capacity(branches.len());

    for name in branches {
        let result = if DELETE_PROTECTED.contains(&name.as_str()) {
            CleanupResult {
                branch: name.clone(),
                status: CleanupStatus::Skipped,
                message: Some("protected branch".to_string()),
            }
        } else if dry_run {
            CleanupResult {
                branch: name.clone(),
                status: CleanupStatus::WouldDelete,
                message: None,
            }
        } else {
            match delete_branch(git, repo, name, false).await {
                Ok(_) => CleanupResult {
                    branch: name.clone(),
                    status: CleanupStatus::Deleted,
                    message: None,
                },
                Err(e) => {
                    warn!(branch = %name, err = %e, "cleanup failed for branch");
                    CleanupResult {
                        branch: name.clone(),
                        status: CleanupStatus::Error,
                        message: Some(e.to_string()),
                    }
                }
            }
        };
        results.push(result);
    }

    let summary = CleanupSummary {
        total: results.len(),
        deleted: results
            .iter()
            .filter(|r| matches!(r.status, CleanupStatus::Deleted | CleanupStatus::WouldDelete))
            .count(),
        skipped: results
            .iter()
            .filter(|r| r.status == CleanupStatus::Skipped)
            .count(),
        errors: results
            .iter()
            .filter(|r| r.status == CleanupStatus::Error)
            .count(),
    };

    CleanupReport {
        results,
        summary,
        dry_run,
    }
}
