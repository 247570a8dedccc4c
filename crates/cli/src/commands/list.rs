//! List command for displaying tasks
//!
//! Implements the `tb list` command: one page of tasks under a filter
//! context, as a table or as JSON.

use clap::Args;
use taskboard_client::{FilterContext, Priority, Status};

use super::reorder::page_offset;
use super::{parse_priority, parse_status};
use crate::context::{Backend, Context};
use crate::error::CliResult;
use crate::output::{format_page_footer, format_task_table};

/// Search, filter, and pagination options
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Search text in title and description
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by status (pending, in-progress, completed)
    #[arg(short, long, value_parser = parse_status)]
    pub status: Option<Status>,

    /// Filter by priority (low, medium, high)
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Tasks per page (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<u32>,
}

impl FilterArgs {
    /// Build the filter context for these options.
    pub fn to_filter(&self, default_limit: u32) -> FilterContext {
        let mut filter = FilterContext::new();
        if let Some(search) = &self.search {
            filter = filter.with_search(search);
        }
        if let Some(status) = self.status {
            filter = filter.with_status(status);
        }
        if let Some(priority) = self.priority {
            filter = filter.with_priority(priority);
        }
        // Page last: changing the search resets it
        filter
            .with_limit(self.limit.unwrap_or(default_limit))
            .with_page(self.page)
    }
}

/// List tasks with optional filters
#[derive(Debug, Args)]
pub struct ListCommand {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print the raw page as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListCommand {
    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the backend request fails or the session is
    /// missing.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        let filter = self.filter.to_filter(ctx.page_size);
        let page = ctx.backend.list(&filter).await?;

        if self.json {
            return Ok(serde_json::to_string_pretty(&page)?);
        }

        let mut output = format_task_table(&page.items, page_offset(page.page, page.limit));
        if !page.items.is_empty() {
            output.push('\n');
            output.push_str(&format_page_footer(&page));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_filter_uses_default_limit() {
        let args = FilterArgs {
            page: 1,
            ..FilterArgs::default()
        };
        let filter = args.to_filter(25);
        assert_eq!(filter.limit, 25);
        assert_eq!(filter.page, 1);
        assert!(!filter.is_filtered());
    }

    #[test]
    fn test_to_filter_applies_all_options() {
        let args = FilterArgs {
            search: Some("  docs ".to_string()),
            status: Some(Status::Pending),
            priority: Some(Priority::High),
            page: 3,
            limit: Some(4),
        };
        let filter = args.to_filter(10);
        assert_eq!(filter.search(), Some("docs"));
        assert_eq!(filter.status, Some(Status::Pending));
        assert_eq!(filter.priority, Some(Priority::High));
        assert_eq!(filter.page, 3);
        assert_eq!(filter.limit, 4);
    }
}
