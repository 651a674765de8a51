//! SENTINEL - partner and supplier risk monitoring server
//!
//! Serves the dashboard API over the bundled mock dataset and persists
//! Decision Room posts.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: 0.0.0.0:8080, sled under ./data
//! cargo run --release
//!
//! # Ephemeral run with JSON logs
//! ./sentinel --in-memory --log-json --addr 127.0.0.1:9000
//! ```
//!
//! # Environment Variables
//!
//! - `SENTINEL_CONFIG`: Path to a TOML config file
//! - `SENTINEL_CORS_ORIGINS`: Extra comma-separated CORS origins
//! - `RUST_LOG`: Logging level (default: info)
//! - `RESET_DB`: Set to "true" to wipe persistent data on startup

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use sentinel::api::{create_app, ApiState};
use sentinel::config::{self, SentinelConfig};
use sentinel::jobs::ModelRunner;
use sentinel::mock::MockDataset;
use sentinel::storage::open_backends;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(about = "SENTINEL partner and supplier risk monitoring server")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML config file (overrides SENTINEL_CONFIG)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep posts and caches in memory only
    #[arg(long)]
    in_memory: bool,

    /// Override the data directory
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, env = "SENTINEL_LOG_JSON")]
    log_json: bool,

    /// Wipe the data directory on startup.
    /// Can also be set via RESET_DB=true environment variable.
    #[arg(long)]
    reset_db: bool,
}

// ============================================================================
// Startup helpers
// ============================================================================

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn should_reset_db(cli_flag: bool) -> bool {
    if cli_flag {
        return true;
    }
    if let Ok(val) = std::env::var("RESET_DB") {
        let val_lower = val.to_lowercase();
        return val_lower == "true" || val_lower == "1" || val_lower == "yes";
    }
    false
}

/// Remove the data directory and all its contents.
fn reset_data_directory(data_path: &Path) -> Result<()> {
    if !data_path.exists() {
        info!("Data directory does not exist, nothing to reset");
        return Ok(());
    }
    warn!(path = %data_path.display(), "RESET_DB set, wiping persistent data");
    std::fs::remove_dir_all(data_path).context("Failed to remove data directory")?;
    info!("Data directory removed");
    Ok(())
}

fn load_config(args: &CliArgs) -> Result<SentinelConfig> {
    let mut config = match &args.config {
        Some(path) => SentinelConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SentinelConfig::load(),
    };
    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }
    if let Some(dir) = &args.data_dir {
        config.storage.data_dir = dir.clone();
    }
    if args.in_memory {
        config.storage.in_memory = true;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// ============================================================================
// Supervised tasks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskName {
    HttpServer,
    ModelRunner,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
            TaskName::ModelRunner => write!(f, "ModelRunner"),
        }
    }
}

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

fn spawn_model_runner(
    task_set: &mut JoinSet<Result<TaskName>>,
    runner: ModelRunner,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        runner.run(cancel_token).await;
        Ok(TaskName::ModelRunner)
    });
}

/// Monitor tasks; a failing task cancels the rest.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Supervisor: shutdown signal received");
                break;
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!("Supervisor: task {} completed", task_name);
                    }
                    Some(Ok(Err(e))) => {
                        error!("Supervisor: task failed: {}", e);
                        cancel_token.cancel();
                        return Err(e);
                    }
                    Some(Err(e)) => {
                        error!("Supervisor: task panicked: {}", e);
                        cancel_token.cancel();
                        return Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => break,
                }
            }
        }
    }

    // Let the remaining tasks observe the cancellation and drain.
    while let Some(result) = task_set.join_next().await {
        match result {
            Ok(Ok(task_name)) => info!("Supervisor: task {} stopped", task_name),
            Ok(Err(e)) => warn!("Supervisor: task error during shutdown: {}", e),
            Err(e) => warn!("Supervisor: task panicked during shutdown: {}", e),
        }
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    let sentinel_config = load_config(&args)?;

    if should_reset_db(args.reset_db) {
        reset_data_directory(&sentinel_config.storage.data_dir)?;
    }

    let (posts, _kv) = open_backends(&sentinel_config.storage.data_dir, sentinel_config.storage.in_memory)
        .context("Failed to open storage")?;

    let dataset = Arc::new(MockDataset::from_config(&sentinel_config));
    info!(
        companies = dataset.companies().len(),
        as_of = %dataset.as_of(),
        seed = sentinel_config.mock.seed,
        "Mock dataset ready"
    );

    config::init(sentinel_config.clone());
    let addr = sentinel_config.server.addr.clone();

    let (state, runner) = ApiState::new(sentinel_config, dataset, posts);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, version = env!("CARGO_PKG_VERSION"), "SENTINEL listening");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("Received Ctrl+C, initiating shutdown");
        shutdown_token.cancel();
    });

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());
    spawn_model_runner(&mut task_set, runner, cancel_token.clone());

    run_supervisor(&mut task_set, cancel_token).await?;
    info!("SENTINEL stopped");
    Ok(())
}
