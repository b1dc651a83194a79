use anyhow::Result;
use clap::Parser;
use reposcope::{config::ServerConfig, rest, AppContext};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "reposcope",
    about = "Repository status aggregation service — worktrees, branches, and commit history over HTTP",
    version
)]
struct Args {
    /// HTTP listen port
    #[arg(long, env = "GIT_SERVER_PORT")]
    port: Option<u16>,

    /// Repository to report on (default: current directory)
    #[arg(long, env = "GIT_SERVER_REPO")]
    repo: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GIT_SERVER_LOG")]
    log: Option<String>,

    /// Log output format: "pretty" (default) | "json"
    #[arg(long, env = "GIT_SERVER_LOG_FORMAT")]
    log_format: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "GIT_SERVER_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,

    /// Bind address for the HTTP server (default: 127.0.0.1)
    #[arg(long, env = "GIT_SERVER_BIND")]
    bind: Option<String>,

    /// Path to a TOML config file (default: ./reposcope.toml if present)
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServerConfig::new(
        args.port,
        args.repo,
        args.log,
        args.log_format,
        args.log_file,
        args.bind,
        args.config,
    );

    let _log_guard = setup_logging(&config.log, config.log_file.as_deref(), &config.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        repo = %config.repo_path.display(),
        port = config.port,
        max_concurrent_git = config.max_concurrent_git,
        "starting reposcope"
    );

    // Sanity check only — a repository mounted after startup still works,
    // requests against a missing one return 500 per the error contract.
    if !config.repo_path.join(".git").exists() && !config.repo_path.join("HEAD").exists() {
        warn!(
            repo = %config.repo_path.display(),
            "repository path does not look like a git checkout"
        );
    }

    let ctx = AppContext::new(config);
    rest::start_server(ctx).await
}

fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("reposcope.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stdout-only — don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
        }
        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
