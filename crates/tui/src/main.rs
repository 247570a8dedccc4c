//! Entry point for the Taskboard TUI application.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use taskboard_client::config::config_dir;
use taskboard_client::{
    ClientConfig, ConfigOverrides, MemoryBackend, SavedSession, SessionStore, connect,
};
use taskboard_tui::{App, Backend, TuiError, TuiResult};

/// Taskboard dashboard in the terminal
#[derive(Parser)]
#[command(name = "tb-tui")]
#[command(version = "0.1.0")]
#[command(about = "Interactive terminal dashboard for the Taskboard backend", long_about = None)]
struct Args {
    /// Base URL of the backend API (can also be set via TASKBOARD_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Path to the config file (can also be set via TASKBOARD_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the saved session file written by `tb login`
    #[arg(long, env = "TASKBOARD_SESSION")]
    session: Option<PathBuf>,

    /// Run against built-in demo data instead of the backend
    #[arg(long)]
    offline: bool,

    /// Where to write logs (defaults to tb-tui.log in the config directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Send logs to a file; the terminal belongs to the UI.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. The returned
/// guard flushes buffered lines when dropped.
fn init_logging(file: Option<&Path>) -> TuiResult<WorkerGuard> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("tb-tui.log"),
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| TuiError::Logging(format!("invalid log file {}", path.display())))?;
    std::fs::create_dir_all(dir)
        .map_err(|e| TuiError::Logging(format!("{}: {}", dir.display(), e)))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| TuiError::Logging(e.to_string()))?;
    Ok(guard)
}

/// Saved session from `tb login`, if there is a readable one.
fn load_saved_session(path: Option<PathBuf>) -> Option<SavedSession> {
    let store = match path {
        Some(path) => SessionStore::new(path),
        None => SessionStore::default_location()?,
    };
    match store.load() {
        Ok(saved) => saved,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable saved session");
            None
        }
    }
}

async fn run_app<B: Backend>(backend: Arc<B>, config: ClientConfig) -> TuiResult<()> {
    let mut app = App::new(backend, config);
    app.run().await
}

/// Run the application with the given arguments
async fn run_with_args(args: Args) -> TuiResult<()> {
    let config = ClientConfig::load(&ConfigOverrides {
        api_url: args.api_url,
        config_path: args.config,
    })?;
    let _log_guard = init_logging(args.log_file.as_deref())?;

    if args.offline {
        info!("tb-tui starting with demo data");
        return run_app(Arc::new(MemoryBackend::with_demo_data()), config).await;
    }

    info!(api_url = %config.api_url, "tb-tui starting");
    let saved = load_saved_session(args.session);
    let client = connect(&config, saved.as_ref())?;
    let result = run_app(Arc::new(client), config).await;
    info!("tb-tui exiting");
    result
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_with_args(Args::parse()).await {
        eprintln!("error: {}", e.full_message());
        process::exit(1);
    }
}
