use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 3005;
const DEFAULT_MAX_CONCURRENT_GIT: usize = 8;
const DEFAULT_GIT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONFIG_FILE: &str = "reposcope.toml";

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

/// The dashboard dev servers the CORS allowlist covers by default.
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `reposcope.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP listen port (default: 3005).
    port: Option<u16>,
    /// Repository the service reports on (default: current directory).
    repo_path: Option<PathBuf>,
    /// Log level filter string, e.g. "debug", "info,reposcope=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Bind address for the HTTP server (default: "127.0.0.1").
    bind_address: Option<String>,
    /// Origins allowed by CORS (default: the two localhost dev-server origins).
    cors_origins: Option<Vec<String>>,
    /// Cap on concurrently-running git subprocesses (default: 8).
    max_concurrent_git: Option<usize>,
    /// Per-call git subprocess timeout in seconds (default: 30).
    git_timeout_secs: Option<u64>,
}

fn load_toml(path: &Path) -> Option<TomlConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config file — using defaults");
            None
        }
    }
}

// ─── ServerConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Repository the service reports on. Passed into every git call.
    pub repo_path: PathBuf,
    pub log: String,
    /// "pretty" (default) | "json".
    pub log_format: String,
    /// Write logs to this file path (rotated daily). Optional.
    pub log_file: Option<PathBuf>,
    /// Bind address for the HTTP server (default: "127.0.0.1").
    pub bind_address: String,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Cap on concurrently-running git subprocesses.
    pub max_concurrent_git: usize,
    /// Per-call git subprocess timeout in seconds.
    pub git_timeout_secs: u64,
}

impl ServerConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `--config <path>` (or `./reposcope.toml` if present)
    ///   3. Built-in defaults
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        port: Option<u16>,
        repo_path: Option<PathBuf>,
        log: Option<String>,
        log_format: Option<String>,
        log_file: Option<PathBuf>,
        bind_address: Option<String>,
        config_file: Option<PathBuf>,
    ) -> Self {
        let toml = config_file
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            })
            .and_then(|p| load_toml(&p))
            .unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let repo_path = repo_path
            .or(toml.repo_path)
            .unwrap_or_else(|| PathBuf::from("."));
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());
        let log_format = log_format
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());
        let bind_address = bind_address
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);
        let cors_origins = toml.cors_origins.unwrap_or_else(default_cors_origins);
        let max_concurrent_git = toml
            .max_concurrent_git
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_GIT);
        let git_timeout_secs = toml
            .git_timeout_secs
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_GIT_TIMEOUT_SECS);

        Self {
            port,
            repo_path,
            log,
            log_format,
            log_file,
            bind_address,
            cors_origins,
            max_concurrent_git,
            git_timeout_secs,
        }
    }
}
