//! Update command for changing task fields

use clap::Args;
use taskboard_client::{Priority, Status, TaskPatch, validation::validate_patch};

use super::{parse_priority, parse_status};
use crate::context::{Backend, Context};
use crate::error::CliResult;

/// Update a task's fields
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Task ID
    pub id: String,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,

    /// New status
    #[arg(short, long, value_parser = parse_status)]
    pub status: Option<Status>,

    /// New priority
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<Priority>,
}

impl UpdateCommand {
    fn patch(&self) -> TaskPatch {
        TaskPatch {
            title: self.title.as_ref().map(|t| t.trim().to_string()),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
        }
    }

    /// Execute the update command.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if no field is given, the title is blank, or the
    /// task does not exist.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        let patch = self.patch();
        validate_patch(&patch)?;
        let task = ctx.backend.update(&self.id, &patch).await?;
        Ok(format!(
            "Updated task {}: {} [{}, {}]",
            task.id, task.title, task.status, task.priority
        ))
    }
}
