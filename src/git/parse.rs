//! Typed parsers for git's machine-readable output.
//!
//! Pure functions, no I/O. Each subcommand the service invokes gets exactly
//! one parser, and every parser reports failure explicitly as
//! [`Parse::Malformed`] instead of silently guessing — callers decide
//! whether a malformed entry is dropped (worktree/branch listings) or
//! degrades a single record (last-commit lines).

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;

/// Outcome of parsing one line or block of git output.
#[derive(Debug, Clone, PartialEq)]
pub enum Parse<T> {
    Parsed(T),
    Malformed { input: String, reason: &'static str },
}

impl<T> Parse<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Parse::Parsed(v) => Some(v),
            Parse::Malformed { .. } => None,
        }
    }

    fn malformed(input: &str, reason: &'static str) -> Self {
        Parse::Malformed {
            input: input.to_string(),
            reason,
        }
    }
}

/// Short-hash length used for worktree commit ids.
const SHORT_HASH_LEN: usize = 12;

// ─── git worktree list --porcelain ───────────────────────────────────────────

/// One checked-out worktree from `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorktreeRecord {
    pub path: PathBuf,
    /// Shortened commit hash (12 hex chars).
    pub commit: String,
    /// Branch name with the `refs/heads/` prefix stripped.
    pub branch: String,
}

/// Parse `git worktree list --porcelain` output into per-worktree records.
///
/// Blocks are separated by blank lines; a well-formed block carries
/// `worktree <path>`, `HEAD <hex>`, and `branch refs/heads/<name>` lines.
/// Bare and detached entries have no branch and are reported as malformed —
/// the listing endpoint drops them rather than erroring the whole parse.
pub fn parse_worktree_list(output: &str) -> Vec<Parse<WorktreeRecord>> {
    output
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(parse_worktree_block)
        .collect()
}

fn parse_worktree_block(block: &str) -> Parse<WorktreeRecord> {
    let mut path = None;
    let mut head = None;
    let mut branch = None;
    let mut bare = false;
    let mut detached = false;

    for line in block.lines() {
        if let Some(rest) = line.strip_prefix("worktree ") {
            path = Some(PathBuf::from(rest.trim()));
        } else if let Some(rest) = line.strip_prefix("HEAD ") {
            head = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("branch ") {
            let name = rest.trim();
            branch = Some(name.strip_prefix("refs/heads/").unwrap_or(name).to_string());
        } else if line.trim() == "bare" {
            bare = true;
        } else if line.trim() == "detached" {
            detached = true;
        }
        // Unknown attribute lines (locked, prunable, ...) are ignored.
    }

    let Some(path) = path else {
        return Parse::malformed(block, "missing worktree line");
    };
    if bare {
        return Parse::malformed(block, "bare repository entry");
    }
    let Some(head) = head else {
        return Parse::malformed(block, "missing HEAD line");
    };
    if head.len() < 7 || !head.chars().all(|c| c.is_ascii_hexdigit()) {
        return Parse::malformed(block, "HEAD is not a commit hash");
    }
    if detached {
        return Parse::malformed(block, "detached HEAD");
    }
    let Some(branch) = branch.filter(|b| !b.is_empty()) else {
        return Parse::malformed(block, "missing branch line");
    };

    let commit = head.chars().take(SHORT_HASH_LEN).collect();
    Parse::Parsed(WorktreeRecord {
        path,
        commit,
        branch,
    })
}

// ─── git log -1 --format=%h|%s|%ar|%an ───────────────────────────────────────

/// Last-commit fields from the `%h|%s|%ar|%an` one-line format.
#[derive(Debug, Clone, PartialEq)]
pub struct LastCommitRecord {
    pub hash: String,
    pub message: String,
    pub relative_time: String,
    pub author: String,
}

/// Parse one `%h|%s|%ar|%an` line. The line must split into exactly four
/// parts — subjects containing `|` are reported malformed, and the caller
/// maps that to an absent `lastCommit`.
pub fn parse_last_commit(line: &str) -> Parse<LastCommitRecord> {
    let line = line.trim();
    if line.is_empty() {
        return Parse::malformed(line, "empty line");
    }
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() != 4 {
        return Parse::malformed(line, "expected 4 |-separated fields");
    }
    if parts[0].is_empty() || !parts[0].chars().all(|c| c.is_ascii_hexdigit()) {
        return Parse::malformed(line, "hash field is not hex");
    }
    Parse::Parsed(LastCommitRecord {
        hash: parts[0].to_string(),
        message: parts[1].to_string(),
        relative_time: parts[2].to_string(),
        author: parts[3].to_string(),
    })
}

// ─── git rev-list --left-right --count ───────────────────────────────────────

/// Parse the `<ahead>\t<behind>` pair emitted by
/// `git rev-list --left-right --count <ref>...<upstream>`.
pub fn parse_ahead_behind(output: &str) -> Parse<(u64, u64)> {
    let mut fields = output.split_whitespace();
    let (Some(ahead), Some(behind), None) = (fields.next(), fields.next(), fields.next()) else {
        return Parse::malformed(output, "expected two counts");
    };
    match (ahead.parse::<u64>(), behind.parse::<u64>()) {
        (Ok(a), Ok(b)) => Parse::Parsed((a, b)),
        _ => Parse::malformed(output, "counts are not non-negative integers"),
    }
}

// ─── git for-each-ref ────────────────────────────────────────────────────────

/// The `--format` string used for branch listing. Field separator is `|`;
/// the subject comes last so a `|` inside it cannot shift earlier fields.
pub const REF_LINE_FORMAT: &str =
    "%(refname)|%(committerdate:iso8601-strict)|%(authorname)|%(contents:subject)";

/// One branch ref from `git for-each-ref refs/heads refs/remotes`.
#[derive(Debug, Clone, PartialEq)]
pub struct RefRecord {
    /// Raw ref name, e.g. `refs/remotes/origin/feature`.
    pub full_name: String,
    /// Short name with `refs/heads/`, `refs/remotes/`, and a leading
    /// `origin/` stripped.
    pub name: String,
    pub is_remote: bool,
    pub date: DateTime<FixedOffset>,
    pub author: String,
    pub message: String,
}

/// Parse one [`REF_LINE_FORMAT`] line.
pub fn parse_ref_line(line: &str) -> Parse<RefRecord> {
    let line = line.trim();
    if line.is_empty() {
        return Parse::malformed(line, "empty line");
    }
    let parts: Vec<&str> = line.splitn(4, '|').collect();
    if parts.len() != 4 {
        return Parse::malformed(line, "expected 4 |-separated fields");
    }

    let full_name = parts[0].to_string();
    let (short, is_remote) = if let Some(rest) = full_name.strip_prefix("refs/heads/") {
        (rest, false)
    } else if let Some(rest) = full_name.strip_prefix("refs/remotes/") {
        (rest, true)
    } else {
        return Parse::malformed(line, "ref is not a branch");
    };
    let name = short.strip_prefix("origin/").unwrap_or(short).to_string();
    if name.is_empty() {
        return Parse::malformed(line, "empty branch name");
    }

    let Ok(date) = DateTime::parse_from_rfc3339(parts[1]) else {
        return Parse::malformed(line, "committer date is not iso8601-strict");
    };

    Parse::Parsed(RefRecord {
        full_name,
        name,
        is_remote,
        date,
        author: parts[2].to_string(),
        message: parts[3].to_string(),
    })
}

/// True for the symbolic `HEAD` pointer entries (`HEAD`, `origin/HEAD`)
/// that branch listings filter out before processing.
pub fn is_head_pointer(record: &RefRecord) -> bool {
    record.name == "HEAD" || record.full_name.ends_with("/HEAD")
}

// ─── git branch --merged ─────────────────────────────────────────────────────

/// Parse `git branch --merged --format=%(refname:short)` into the set of
/// merged branch names.
pub fn parse_merged_set(output: &str) -> HashSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "HEAD" && !l.starts_with('('))
        .map(str::to_string)
        .collect()
}

// ─── git status --porcelain ──────────────────────────────────────────────────

/// Count changed entries in `git status --porcelain` output.
pub fn count_status_lines(output: &str) -> u64 {
    output.lines().filter(|l| !l.trim().is_empty()).count() as u64
}

// ─── commit trailer ──────────────────────────────────────────────────────────

static TASK_TRAILER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Task:\s*#([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})",
    )
    .expect("task trailer regex is valid")
});

/// Extract the optional `Task: #<uuid>` trailer from a full commit message.
pub fn extract_task_id(body: &str) -> Option<String> {
    TASK_TRAILER
        .captures(body)
        .map(|caps| caps[1].to_string())
}
