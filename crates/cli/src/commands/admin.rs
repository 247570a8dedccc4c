//! Admin commands for managing users and their tasks
//!
//! Every subcommand verifies the session first and refuses to run for
//! non-admin users before any admin endpoint is called.

use clap::Subcommand;
use taskboard_client::{AuthSession, Role, Route, gate};

use crate::context::{Backend, Context};
use crate::error::{CliError, CliResult};
use crate::output::{format_task_table, format_user_table};

/// Manage users and their tasks (admin only)
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List every user
    Users,
    /// Change a user's role
    Role {
        /// User ID
        user_id: String,
        /// New role (user, admin)
        #[arg(value_parser = parse_role)]
        role: Role,
    },
    /// Delete a user and their tasks
    DeleteUser {
        /// User ID
        user_id: String,
    },
    /// List a user's tasks
    Tasks {
        /// User ID
        user_id: String,
    },
    /// Delete any user's task
    DeleteTask {
        /// Task ID
        task_id: String,
    },
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::parse(s).ok_or_else(|| format!("invalid role '{}'. Valid values: user, admin", s))
}

impl AdminCommand {
    fn route(&self) -> Route {
        match self {
            AdminCommand::Tasks { user_id } => Route::AdminUserTasks(user_id.clone()),
            _ => Route::Admin,
        }
    }

    async fn require_admin<B: Backend>(&self, ctx: &Context<B>) -> CliResult<AuthSession> {
        let session = ctx.verified_session().await?;
        let wanted = self.route();
        if gate(wanted.clone(), &session) != wanted {
            let email = session.user().map(|u| u.email.clone()).unwrap_or_default();
            return Err(CliError::AdminRequired { email });
        }
        Ok(session)
    }

    /// Execute the admin subcommand.
    ///
    /// # Errors
    ///
    /// Returns `CliError::AdminRequired` if the session user is not an
    /// admin, or any backend error.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        self.require_admin(ctx).await?;

        match self {
            AdminCommand::Users => {
                let users = ctx.backend.list_users().await?;
                Ok(format_user_table(&users))
            }
            AdminCommand::Role { user_id, role } => {
                ctx.backend.update_user_role(user_id, *role).await?;
                Ok(format!("User {} is now {}", user_id, role))
            }
            AdminCommand::DeleteUser { user_id } => {
                ctx.backend.delete_user(user_id).await?;
                Ok(format!("Deleted user {}", user_id))
            }
            AdminCommand::Tasks { user_id } => {
                let tasks = ctx.backend.user_tasks(user_id).await?;
                Ok(format_task_table(&tasks, 0))
            }
            AdminCommand::DeleteTask { task_id } => {
                ctx.backend.delete(task_id).await?;
                Ok(format!("Deleted task {}", task_id))
            }
        }
    }
}
