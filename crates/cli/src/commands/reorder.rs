//! Move command for reordering tasks
//!
//! Runs the same optimistic reorder as the dashboard: fetch the page, apply
//! the move locally, persist the new position, and roll back on failure.

use clap::Args;
use taskboard_client::reorder::outcome_error;
use taskboard_client::{ClientError, MoveOutcome, ReorderController};

use super::list::FilterArgs;
use crate::context::{Backend, Context};
use crate::error::CliResult;
use crate::output::format_task_table;

/// Move a task onto another task's position within a page
#[derive(Debug, Args)]
pub struct MoveCommand {
    /// ID of the task to move
    pub id: String,

    /// ID of the task whose position it takes
    #[arg(long)]
    pub over: String,

    /// Page the tasks are on
    #[command(flatten)]
    pub filter: FilterArgs,
}

impl MoveCommand {
    /// Execute the move command.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the task is not on the page, or a
    /// "Failed to update position" error if the backend rejects the move.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        let mut controller = ReorderController::new(self.filter.to_filter(ctx.page_size));
        controller.load(&ctx.backend).await?;

        let page = controller.filter().page;
        let on_page = |id: &str| controller.tasks().iter().any(|t| t.id == id);
        if !on_page(&self.id) {
            return Err(ClientError::NotFound {
                resource: "Task",
                id: self.id.clone(),
            }
            .into());
        }
        if !on_page(&self.over) {
            return Ok(format!(
                "Move cancelled: task '{}' is not on page {}",
                self.over, page
            ));
        }

        let outcome = controller
            .commit_and_persist(&ctx.backend, &self.id, &self.over)
            .await;

        match outcome {
            None => Ok(format!("Task {} is already in that position", self.id)),
            Some(MoveOutcome::Committed) => {
                let tasks = controller.tasks();
                let position = tasks.iter().position(|t| t.id == self.id).unwrap_or(0);
                let offset = page_offset(page, controller.filter().limit);
                Ok(format!(
                    "Moved task {} to position {}\n\n{}",
                    self.id,
                    position,
                    format_task_table(tasks, offset)
                ))
            }
            Some(other) => match outcome_error(&other) {
                Some(err) => Err(err.into()),
                None => Ok(format!("Task list changed while moving {}", self.id)),
            },
        }
    }
}

/// Index of the first task on `page` across the whole listing
pub(crate) fn page_offset(page: u32, limit: u32) -> usize {
    (page.saturating_sub(1) as usize).saturating_mul(limit as usize)
}
