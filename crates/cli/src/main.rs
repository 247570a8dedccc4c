use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use taskboard_cli::{CliError, CliResult, Command, Context};
use taskboard_client::{ClientConfig, ClientError, ConfigOverrides, SessionStore, connect};

/// Taskboard - manage your tasks from the terminal
#[derive(Parser)]
#[command(name = "tb")]
#[command(version = "0.1.0")]
#[command(about = "Command-line client for the Taskboard backend", long_about = None)]
struct Args {
    /// Base URL of the backend API (can also be set via TASKBOARD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to the config file (can also be set via TASKBOARD_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the saved session file
    #[arg(long, global = true, env = "TASKBOARD_SESSION")]
    session: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

/// Initialize logging from `RUST_LOG`, defaulting to warnings on stderr.
///
/// Examples:
/// - `RUST_LOG=debug` - show request and cache activity
/// - `RUST_LOG=taskboard_client=trace` - everything from the client library
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run_app().await {
        eprintln!("error: {}", e.full_message());
        process::exit(1);
    }
}

/// Main application logic - separated for testability
async fn run_app() -> CliResult<()> {
    let args = Args::parse();
    run_with_args(&args).await
}

/// Pick the session file: `--session` first, then the config directory.
fn resolve_session_store(cli_session: Option<PathBuf>) -> CliResult<SessionStore> {
    match cli_session {
        Some(path) => Ok(SessionStore::new(path)),
        None => SessionStore::default_location().ok_or(CliError::NoConfigDir),
    }
}

/// Run the application with the given arguments
async fn run_with_args(args: &Args) -> CliResult<()> {
    let config = ClientConfig::load(&ConfigOverrides {
        api_url: args.api_url.clone(),
        config_path: args.config.clone(),
    })?;
    debug!(api_url = %config.api_url, "configuration loaded");

    let Some(cmd) = &args.command else {
        println!("Welcome to Taskboard!");
        println!("Use 'tb --help' for usage information.");
        return Ok(());
    };

    let sessions = resolve_session_store(args.session.clone())?;
    let saved = match sessions.load() {
        Ok(saved) => saved,
        Err(ClientError::Decode { .. }) => {
            warn!(path = %sessions.path().display(), "discarding unreadable session file");
            sessions.clear()?;
            return Err(CliError::BadSession {
                path: sessions.path().to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let backend = connect(&config, saved.as_ref())?;
    let ctx = Context::new(backend, sessions, config.page_size);

    let result = cmd.execute(&ctx).await?;
    println!("{}", result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "tb-main-{}-{}-{}",
            name,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(["tb"]).unwrap();
        assert!(args.api_url.is_none());
        assert!(args.config.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "tb",
            "list",
            "--api-url",
            "http://example.test/api",
            "--session",
            "/tmp/s.json",
        ])
        .unwrap();
        assert_eq!(args.api_url.as_deref(), Some("http://example.test/api"));
        assert_eq!(args.session, Some(PathBuf::from("/tmp/s.json")));
        assert!(matches!(args.command, Some(Command::List(_))));
    }

    #[test]
    fn test_add_command_requires_title() {
        let result = Args::try_parse_from(["tb", "add"]);
        match result {
            Err(e) => {
                let err = e.to_string();
                assert!(
                    err.contains("required") || err.contains("<TITLE>"),
                    "Error should mention the required title argument, got: {}",
                    err
                );
            }
            Ok(_) => panic!("Expected error for missing title"),
        }
    }

    #[test]
    fn test_add_command_invalid_priority() {
        let result = Args::try_parse_from(["tb", "add", "Task", "--priority", "wrong"]);
        match result {
            Err(e) => assert!(e.to_string().contains("invalid priority 'wrong'")),
            Ok(_) => panic!("Expected error for invalid priority"),
        }
    }

    #[test]
    fn test_resolve_session_store_prefers_flag() {
        let store = resolve_session_store(Some(PathBuf::from("/custom/session.json"))).unwrap();
        assert_eq!(store.path(), PathBuf::from("/custom/session.json").as_path());
    }

    #[tokio::test]
    async fn test_run_with_args_no_command() {
        let args = Args {
            api_url: Some("http://127.0.0.1:9/api".to_string()),
            config: None,
            session: Some(temp_path("none").join("session.json")),
            command: None,
        };
        let result = run_with_args(&args).await;
        assert!(result.is_ok(), "run_with_args failed: {:?}", result.err());
    }

    #[tokio::test]
    async fn test_run_with_missing_config_file_fails() {
        let args = Args {
            api_url: None,
            config: Some(temp_path("missing").join("config.toml")),
            session: None,
            command: None,
        };
        let err = run_with_args(&args).await.unwrap_err();
        assert!(matches!(err, CliError::Client(ClientError::Io { .. })));
    }

    #[tokio::test]
    async fn test_corrupt_session_file_is_discarded() {
        let dir = temp_path("corrupt");
        fs::create_dir_all(&dir).unwrap();
        let session = dir.join("session.json");
        fs::write(&session, "not json").unwrap();

        let args = Args::try_parse_from([
            "tb",
            "--api-url",
            "http://127.0.0.1:9/api",
            "--session",
            session.to_str().unwrap(),
            "whoami",
        ])
        .unwrap();

        let err = run_with_args(&args).await.unwrap_err();
        assert!(matches!(err, CliError::BadSession { .. }));
        assert!(!session.exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
