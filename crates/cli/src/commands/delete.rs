//! Delete command

use clap::Args;

use crate::context::{Backend, Context};
use crate::error::CliResult;

/// Delete a task
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Task ID
    pub id: String,
}

impl DeleteCommand {
    /// Execute the delete command.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        ctx.backend.delete(&self.id).await?;
        Ok(format!("Deleted task {}", self.id))
    }
}
