pub mod config;
pub mod git;
pub mod observability;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use config::ServerConfig;
use git::exec::GitRunner;

/// Shared application state passed to every route handler.
///
/// The service is stateless per request — this holds only configuration and
/// the bounded subprocess runner. The repository path lives in config and is
/// passed explicitly into every git call; there is no global git client.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub git: Arc<GitRunner>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let git = Arc::new(GitRunner::new(
            config.max_concurrent_git,
            Duration::from_secs(config.git_timeout_secs),
        ));
        Arc::new(Self {
            config: Arc::new(config),
            git,
            started_at: std::time::Instant::now(),
        })
    }
}
