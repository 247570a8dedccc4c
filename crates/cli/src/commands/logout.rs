//! Logout command

use clap::Args;
use taskboard_client::AuthSession;
use tracing::warn;

use crate::context::{Backend, Context};
use crate::error::CliResult;

/// End the session
#[derive(Debug, Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    /// Execute the logout command.
    ///
    /// The saved session is removed even if the backend cannot be reached.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        let mut session = AuthSession::new();
        if let Err(err) = session.logout(&ctx.backend).await {
            warn!(error = %err, "backend logout failed; clearing local session anyway");
        }
        ctx.sessions.clear()?;
        Ok("Logged out".to_string())
    }
}
