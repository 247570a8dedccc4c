//! Add command for creating new tasks

use clap::Args;
use taskboard_client::{Priority, Status, TaskDraft, validation::validate_draft};

use super::{parse_priority, parse_status};
use crate::context::{Backend, Context};
use crate::error::CliResult;

/// Create a new task
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Title of the task
    #[arg(required = true)]
    pub title: String,

    /// Detailed description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Initial status (defaults to pending)
    #[arg(short, long, value_parser = parse_status)]
    pub status: Option<Status>,

    /// Priority (defaults to low)
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<Priority>,
}

impl AddCommand {
    fn draft(&self) -> TaskDraft {
        let mut draft = TaskDraft::new(self.title.trim());
        if let Some(description) = &self.description {
            draft = draft.with_description(description.trim());
        }
        if let Some(status) = self.status {
            draft = draft.with_status(status);
        }
        if let Some(priority) = self.priority {
            draft = draft.with_priority(priority);
        }
        draft
    }

    /// Execute the add command.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the title is blank or the backend rejects the
    /// task.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        let draft = self.draft();
        validate_draft(&draft)?;
        let task = ctx.backend.create(&draft).await?;
        Ok(format!("Created task {}: {}", task.id, task.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_defaults() {
        let cmd = AddCommand {
            title: "  Write docs ".to_string(),
            description: None,
            status: None,
            priority: None,
        };
        let draft = cmd.draft();
        assert_eq!(draft.title, "Write docs");
        assert_eq!(draft.status, Status::Pending);
        assert_eq!(draft.priority, Priority::Low);
    }
}
