// SPDX-License-Identifier: MIT
//! Bounded git subprocess runner.
//!
//! The only component in the crate that spawns processes. Every invocation
//! is `git -C <dir> <args...>` with captured stdout/stderr — argv only, no
//! shell is ever involved. A semaphore caps the number of concurrently
//! running children so a request fanning out over N worktrees cannot
//! exhaust process slots; callers above the cap queue until a permit frees.
//!
//! Every call is attempted exactly once — callers decide per call site
//! whether a failure degrades the record or fails the request.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

/// Captured output of a successful git invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to spawn git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git exited with status {code:?}: {stderr}")]
    NonZero { code: Option<i32>, stderr: String },
    #[error("git timed out after {secs}s")]
    TimedOut { secs: u64 },
}

impl GitError {
    /// The captured stderr, when the process ran at all.
    pub fn stderr(&self) -> &str {
        match self {
            GitError::NonZero { stderr, .. } => stderr,
            _ => "",
        }
    }
}

pub struct GitRunner {
    semaphore: Semaphore,
    timeout: Duration,
}

impl GitRunner {
    pub fn new(max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            semaphore: Semaphore::new(max_concurrent.max(1)),
            timeout,
        }
    }

    /// Run `git -C <dir> <args...>` and capture its output.
    ///
    /// Returns `Ok` only on a zero exit status. A non-zero exit carries the
    /// exit code and trimmed stderr; a child that outlives the configured
    /// timeout is killed and reported as [`GitError::TimedOut`].
    pub async fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        // Never closed, so acquire cannot fail.
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("git runner semaphore closed");

        debug!(dir = %dir.display(), ?args, "running git");

        let child = tokio::process::Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(GitError::TimedOut {
                    secs: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(GitError::NonZero {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(GitOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> GitRunner {
        GitRunner::new(4, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn version_succeeds_anywhere() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = runner().run(tmp.path(), &["--version"]).await.unwrap();
        assert!(out.stdout.contains("git version"));
    }

    #[tokio::test]
    async fn status_in_non_repo_is_non_zero() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = runner()
            .run(tmp.path(), &["status", "--porcelain"])
            .await
            .unwrap_err();
        match err {
            GitError::NonZero { stderr, .. } => assert!(!stderr.is_empty()),
            other => panic!("expected NonZero, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stderr_accessor_is_empty_for_spawn_errors() {
        let err = GitError::Spawn(std::io::Error::other("boom"));
        assert_eq!(err.stderr(), "");
    }
}
