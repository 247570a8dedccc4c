//! Stats command for dashboard statistics

use clap::Args;
use taskboard_client::TaskStats;

use super::list::FilterArgs;
use crate::context::{Backend, Context};
use crate::error::CliResult;
use crate::output::format_stats;

/// Show dashboard statistics for a page of tasks
#[derive(Debug, Args)]
pub struct StatsCommand {
    #[command(flatten)]
    pub filter: FilterArgs,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        let filter = self.filter.to_filter(ctx.page_size);
        let page = ctx.backend.list(&filter).await?;
        Ok(format_stats(&TaskStats::from_tasks(&page.items)))
    }
}
