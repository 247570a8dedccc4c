//! Test infrastructure for integration tests
//!
//! Provides an isolated in-memory backend and session file per test plus
//! helpers for running CLI commands against it.

use std::path::PathBuf;

use clap::Parser;
use taskboard_cli::{CliResult, Command, Context};
use taskboard_client::memory::{DEMO_ADMIN_EMAIL, DEMO_EMAIL, DEMO_PASSWORD};
use taskboard_client::{MemoryBackend, SessionStore, Task};

/// Parses a command line the way the `tb` binary does
#[derive(Parser)]
struct TestCli {
    #[command(subcommand)]
    command: Command,
}

/// Test context containing an in-memory backend and a temp session file
pub struct TestContext {
    pub ctx: Context<MemoryBackend>,
    pub temp_dir: PathBuf,
}

impl TestContext {
    /// Create a context around `backend` with its own session directory.
    ///
    /// The directory name uses process ID, thread ID, and a nanosecond
    /// timestamp to keep concurrently running tests apart.
    pub fn with_backend(backend: MemoryBackend, page_size: u32) -> Self {
        let temp_dir = std::env::temp_dir().join(format!(
            "tb-integration-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let sessions = SessionStore::new(temp_dir.join("session.json"));

        Self {
            ctx: Context::new(backend, sessions, page_size),
            temp_dir,
        }
    }

    /// Demo data, nobody logged in, default page size
    pub fn demo() -> Self {
        Self::with_backend(MemoryBackend::with_demo_data(), 10)
    }

    /// Demo user logged in with the given tasks, in order
    pub fn signed_in_with(titles: &[&str], page_size: u32) -> Self {
        let backend = MemoryBackend::signed_in();
        backend.seed_tasks(
            titles
                .iter()
                .enumerate()
                .map(|(i, title)| Task::new(format!("t{}", i + 1), *title))
                .collect(),
        );
        Self::with_backend(backend, page_size)
    }

    pub fn backend(&self) -> &MemoryBackend {
        &self.ctx.backend
    }

    /// Parse and run one command line, e.g. `["list", "--page", "2"]`.
    pub async fn run(&self, args: &[&str]) -> CliResult<String> {
        let mut full = vec!["tb"];
        full.extend_from_slice(args);
        let cli = TestCli::try_parse_from(full).expect("command line should parse");
        cli.command.execute(&self.ctx).await
    }

    pub async fn login_demo(&self) -> String {
        self.run(&["login", DEMO_EMAIL, "--password", DEMO_PASSWORD])
            .await
            .unwrap()
    }

    pub async fn login_admin(&self) -> String {
        self.run(&["login", DEMO_ADMIN_EMAIL, "--password", DEMO_PASSWORD])
            .await
            .unwrap()
    }

    /// Task titles in stored order
    pub fn stored_titles(&self) -> Vec<String> {
        self.backend()
            .all_tasks()
            .into_iter()
            .map(|t| t.title)
            .collect()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.temp_dir);
    }
}
