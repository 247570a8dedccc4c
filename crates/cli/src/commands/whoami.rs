//! Whoami command

use clap::Args;

use super::login::describe;
use crate::context::{Backend, Context};
use crate::error::CliResult;

/// Show the logged-in user
#[derive(Debug, Args)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    /// Execute the whoami command by verifying the session with the backend.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        let session = ctx.verified_session().await?;
        match session.user() {
            Some(user) => Ok(format!("{} [{}]", describe(user), user.id)),
            None => Ok("Not logged in".to_string()),
        }
    }
}
