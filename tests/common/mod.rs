//! Shared fixtures: real repositories on disk, built with git2.
#![allow(dead_code)] // each test binary uses its own subset of the helpers

use std::path::Path;
use std::sync::Arc;

use git2::{Repository, Signature, Time, WorktreeAddOptions};
use reposcope::{config::ServerConfig, AppContext};

pub const DAY_SECS: i64 = 24 * 60 * 60;

/// Create a repository with one initial commit (a README on disk, so the
/// working tree starts clean).
pub fn init_repo(dir: &Path) -> Repository {
    std::fs::create_dir_all(dir).expect("create repo dir");
    let repo = Repository::init(dir).expect("init repo");
    commit_file(&repo, "README.md", "initial\n", "Initial commit", None);
    repo
}

/// Write `name` into the working tree, stage it, and commit on HEAD.
///
/// `backdate_days` shifts both author and committer time into the past.
pub fn commit_file(
    repo: &Repository,
    name: &str,
    content: &str,
    message: &str,
    backdate_days: Option<i64>,
) -> git2::Oid {
    let workdir = repo.workdir().expect("repo has a workdir");
    std::fs::write(workdir.join(name), content).expect("write file");

    let mut index = repo.index().expect("index");
    index.add_path(Path::new(name)).expect("stage file");
    index.write().expect("write index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");

    let sig = signature(backdate_days);
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("commit")
}

/// Create `branch` pointing at a new commit that is NOT on HEAD's branch —
/// the branch diverges and `git branch -d` will refuse to delete it.
pub fn diverged_branch(repo: &Repository, branch: &str, backdate_days: Option<i64>) {
    let head = repo.head().expect("head").peel_to_commit().expect("commit");
    repo.branch(branch, &head, false).expect("create branch");

    let blob = repo.blob(format!("work on {branch}\n").as_bytes()).expect("blob");
    let mut builder = repo
        .treebuilder(Some(&head.tree().expect("tree")))
        .expect("treebuilder");
    builder.insert("wip.txt", blob, 0o100644).expect("insert");
    let tree_id = builder.write().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");

    let sig = signature(backdate_days);
    repo.commit(
        Some(&format!("refs/heads/{branch}")),
        &sig,
        &sig,
        &format!("WIP on {branch}"),
        &tree,
        &[&head],
    )
    .expect("commit to branch");
}

/// Create `branch` at the given commit (defaults to HEAD) without touching
/// the working tree. Such a branch is an ancestor of HEAD, i.e. merged.
pub fn branch_at(repo: &Repository, branch: &str, target: Option<git2::Oid>) {
    let commit = match target {
        Some(oid) => repo.find_commit(oid).expect("find commit"),
        None => repo.head().expect("head").peel_to_commit().expect("commit"),
    };
    repo.branch(branch, &commit, false).expect("create branch");
}

/// Add a linked worktree checked out on a fresh branch of the same name.
pub fn add_worktree(repo: &Repository, name: &str, wt_path: &Path) {
    let head = repo.head().expect("head").peel_to_commit().expect("commit");
    let branch = repo.branch(name, &head, false).expect("create branch");
    let mut opts = WorktreeAddOptions::new();
    opts.reference(Some(branch.get()));
    repo.worktree(name, wt_path, Some(&opts)).expect("add worktree");
}

fn signature(backdate_days: Option<i64>) -> Signature<'static> {
    match backdate_days {
        Some(days) => {
            let now = unix_now_secs();
            Signature::new("Test", "test@example.com", &Time::new(now - days * DAY_SECS, 0))
                .expect("signature")
        }
        None => Signature::now("Test", "test@example.com").expect("signature"),
    }
}

fn unix_now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs() as i64
}

/// App context over `repo` with test-friendly limits.
pub fn test_ctx(repo: &Path) -> Arc<AppContext> {
    AppContext::new(ServerConfig {
        port: 0,
        repo_path: repo.to_path_buf(),
        log: "info".to_string(),
        log_format: "pretty".to_string(),
        log_file: None,
        bind_address: "127.0.0.1".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        max_concurrent_git: 4,
        git_timeout_secs: 30,
    })
}
