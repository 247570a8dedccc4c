//! CLI commands for Taskboard
//!
//! This module contains all subcommand implementations for the tb CLI.

pub mod add;
pub mod admin;
pub mod delete;
pub mod list;
pub mod login;
pub mod logout;
pub mod reorder;
pub mod stats;
pub mod update;
pub mod whoami;

pub use add::AddCommand;
pub use admin::AdminCommand;
pub use delete::DeleteCommand;
pub use list::{FilterArgs, ListCommand};
pub use login::{CredentialArgs, LoginCommand, RegisterCommand};
pub use logout::LogoutCommand;
pub use reorder::MoveCommand;
pub use stats::StatsCommand;
pub use update::UpdateCommand;
pub use whoami::WhoamiCommand;

use clap::Subcommand;
use taskboard_client::{Priority, Status};

use crate::context::{Backend, Context};
use crate::error::CliResult;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and save the session
    Login(LoginCommand),
    /// Create an account and save the session
    Register(RegisterCommand),
    /// End the session
    Logout(LogoutCommand),
    /// Show the logged-in user
    Whoami(WhoamiCommand),
    /// List tasks with filters and pagination
    List(ListCommand),
    /// Create a new task
    Add(AddCommand),
    /// Update a task's fields
    Update(UpdateCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Move a task onto another task's position within a page
    Move(MoveCommand),
    /// Show dashboard statistics
    Stats(StatsCommand),
    /// Manage users and their tasks (admin only)
    #[command(subcommand)]
    Admin(AdminCommand),
}

impl Command {
    /// Execute the command against the context's backend.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the command fails.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        match self {
            Command::Login(cmd) => cmd.execute(ctx).await,
            Command::Register(cmd) => cmd.execute(ctx).await,
            Command::Logout(cmd) => cmd.execute(ctx).await,
            Command::Whoami(cmd) => cmd.execute(ctx).await,
            Command::List(cmd) => cmd.execute(ctx).await,
            Command::Add(cmd) => cmd.execute(ctx).await,
            Command::Update(cmd) => cmd.execute(ctx).await,
            Command::Delete(cmd) => cmd.execute(ctx).await,
            Command::Move(cmd) => cmd.execute(ctx).await,
            Command::Stats(cmd) => cmd.execute(ctx).await,
            Command::Admin(cmd) => cmd.execute(ctx).await,
        }
    }
}

/// Parse a status string into a Status enum
pub(crate) fn parse_status(s: &str) -> Result<Status, String> {
    Status::parse(s).ok_or_else(|| {
        format!(
            "invalid status '{}'. Valid values: pending, in-progress, completed",
            s
        )
    })
}

/// Parse a priority string into a Priority enum
pub(crate) fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| {
        format!(
            "invalid priority '{}'. Valid values: low, medium, high",
            s
        )
    })
}
