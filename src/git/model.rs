//! Wire types for the aggregation endpoints, plus the derived predicates.
//!
//! Every record here is constructed fresh per HTTP request and discarded
//! after serialization — there is no cache and no cross-request state.

use serde::Serialize;

/// Branch names the cleanup heuristics never offer for deletion.
pub const CLEANUP_PROTECTED: &[&str] = &["main", "master", "development"];

/// Branch names the deletion endpoint refuses outright.
pub const DELETE_PROTECTED: &[&str] = &["main", "master", "development", "production"];

// ─── Worktrees ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorktreeInfo {
    pub path: String,
    /// Short commit hash of the checked-out HEAD.
    pub commit: String,
    pub branch: String,
    /// Best-effort: `null` when the follow-up log call yields nothing.
    pub last_commit: Option<LastCommit>,
    pub uncommitted_changes: u64,
    pub ahead: u64,
    pub behind: u64,
    /// Always derived via [`needs_attention`] — never set independently.
    pub needs_attention: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastCommit {
    pub hash: String,
    pub message: String,
    pub relative_time: String,
    pub author: String,
}

/// A worktree needs attention iff it has local changes or has diverged
/// from its upstream in either direction.
pub fn needs_attention(uncommitted_changes: u64, ahead: u64, behind: u64) -> bool {
    uncommitted_changes > 0 || ahead > 0 || behind > 0
}

// ─── Branches ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchInfo {
    /// Short name, `remotes/origin/` qualifier stripped.
    pub name: String,
    /// Raw ref name, e.g. `refs/remotes/origin/feature`.
    pub full_name: String,
    pub is_remote: bool,
    pub is_current: bool,
    pub is_merged: bool,
    pub last_commit: BranchCommit,
    // Local-branch enrichment; absent on remote branches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_upstream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ahead: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behind: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_in_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_delete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggest_cleanup: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchCommit {
    /// Committer date, RFC 3339.
    pub date: String,
    pub author: String,
    pub message: String,
}

/// A branch is safe to delete when it is merged, not checked out, and not
/// one of the protected long-lived branches.
pub fn can_delete(is_merged: bool, is_current: bool, name: &str) -> bool {
    is_merged && !is_current && !CLEANUP_PROTECTED.contains(&name)
}

/// Cleanup suggestion: merged branches idle for more than 30 days, or
/// unmerged branches idle for more than 90.
pub fn suggest_cleanup(is_merged: bool, age_in_days: i64) -> bool {
    if is_merged {
        age_in_days > 30
    } else {
        age_in_days > 90
    }
}

// ─── Commit history ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDetail {
    /// Full commit hash.
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_hash: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// `Task: #<uuid>` trailer, when the commit body carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl CommitDetail {
    /// Substituted for a commit whose metadata could not be retrieved;
    /// the surrounding request still succeeds.
    pub fn retrieval_error(hash: &str) -> Self {
        Self {
            hash: hash.to_string(),
            short_hash: None,
            message: "Error retrieving commit".to_string(),
            relative_time: None,
            author: None,
            task_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_attention_boundaries() {
        assert!(!needs_attention(0, 0, 0));
        assert!(needs_attention(1, 0, 0));
        assert!(needs_attention(0, 1, 0));
        assert!(needs_attention(0, 0, 1));
        assert!(needs_attention(3, 2, 1));
    }

    #[test]
    fn can_delete_full_truth_table() {
        for merged in [false, true] {
            for current in [false, true] {
                for name in ["feature/x", "main", "master", "development"] {
                    let expected = merged && !current && !CLEANUP_PROTECTED.contains(&name);
                    assert_eq!(
                        can_delete(merged, current, name),
                        expected,
                        "merged={merged} current={current} name={name}"
                    );
                }
            }
        }
    }

    #[test]
    fn suggest_cleanup_boundaries() {
        assert!(!suggest_cleanup(true, 30));
        assert!(suggest_cleanup(true, 31));
        assert!(!suggest_cleanup(false, 90));
        assert!(suggest_cleanup(false, 91));
        // Unmerged branches in the merged window are not flagged.
        assert!(!suggest_cleanup(false, 45));
    }

    #[test]
    fn production_is_only_protected_for_deletion() {
        assert!(DELETE_PROTECTED.contains(&"production"));
        assert!(!CLEANUP_PROTECTED.contains(&"production"));
        // Merged, not current, named production: deletable by the cleanup
        // heuristic's definition, but the endpoint-level guard still blocks it.
        assert!(can_delete(true, false, "production"));
    }

    #[test]
    fn error_placeholder_shape() {
        let detail = CommitDetail::retrieval_error("abc123");
        assert_eq!(detail.hash, "abc123");
        assert_eq!(detail.message, "Error retrieving commit");
        assert!(detail.short_hash.is_none());
        assert!(detail.task_id.is_none());
    }

    #[test]
    fn worktree_info_serializes_camel_case() {
        let info = WorktreeInfo {
            path: "/w".into(),
            commit: "abc".into(),
            branch: "main".into(),
            last_commit: None,
            uncommitted_changes: 2,
            ahead: 0,
            behind: 1,
            needs_attention: needs_attention(2, 0, 1),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["uncommittedChanges"], 2);
        assert_eq!(value["needsAttention"], true);
        assert!(value["lastCommit"].is_null());
    }
}
