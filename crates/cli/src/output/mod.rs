//! Output formatting module for Taskboard
//!
//! Provides table formatting and display utilities for CLI output.

use taskboard_client::{Page, Task, TaskStats, User};

/// Maximum width for the title column before truncation
const MAX_TITLE_WIDTH: usize = 40;

/// Truncate a string to the specified maximum width, adding ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    let len = s.chars().count();
    if len <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
}

/// Format tasks into an aligned table string.
///
/// Produces output in the format:
/// ```text
/// #  ID      Status       Priority  Title
/// -  ------  -----------  --------  ---------------------
/// 1  t1      in-progress  high      Finish documentation
/// ```
///
/// `offset` is added to the row number so later pages keep counting.
pub fn format_task_table(tasks: &[Task], offset: usize) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let headers = ["#", "ID", "Status", "Priority", "Title"];
    let numbers: Vec<String> = (1..=tasks.len()).map(|n| (n + offset).to_string()).collect();
    let titles: Vec<String> = tasks
        .iter()
        .map(|t| truncate(&t.title, MAX_TITLE_WIDTH))
        .collect();

    let num_width = column_width(headers[0], numbers.iter().map(String::as_str));
    let id_width = column_width(headers[1], tasks.iter().map(|t| t.id.as_str()));
    let status_width = column_width(headers[2], tasks.iter().map(|t| t.status.as_str()));
    let priority_width = column_width(headers[3], tasks.iter().map(|t| t.priority.as_str()));
    let title_width = column_width(headers[4], titles.iter().map(String::as_str));

    let mut output = String::new();

    output.push_str(&format!(
        "{:<num_w$}  {:<id_w$}  {:<status_w$}  {:<priority_w$}  {:<title_w$}\n",
        headers[0],
        headers[1],
        headers[2],
        headers[3],
        headers[4],
        num_w = num_width,
        id_w = id_width,
        status_w = status_width,
        priority_w = priority_width,
        title_w = title_width,
    ));

    output.push_str(&format!(
        "{:->num_w$}  {:->id_w$}  {:->status_w$}  {:->priority_w$}  {:->title_w$}\n",
        "",
        "",
        "",
        "",
        "",
        num_w = num_width,
        id_w = id_width,
        status_w = status_width,
        priority_w = priority_width,
        title_w = title_width,
    ));

    for ((task, number), title) in tasks.iter().zip(&numbers).zip(&titles) {
        output.push_str(&format!(
            "{:<num_w$}  {:<id_w$}  {:<status_w$}  {:<priority_w$}  {:<title_w$}\n",
            number,
            task.id,
            task.status.as_str(),
            task.priority.as_str(),
            title,
            num_w = num_width,
            id_w = id_width,
            status_w = status_width,
            priority_w = priority_width,
            title_w = title_width,
        ));
    }

    // Drop trailing padding and the final newline
    output
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the pagination line shown under a task table.
pub fn format_page_footer<T>(page: &Page<T>) -> String {
    let task_word = if page.total == 1 { "task" } else { "tasks" };
    format!(
        "Page {} of {} ({} {})",
        page.page,
        page.total_pages.max(1),
        page.total,
        task_word
    )
}

/// Format users into an aligned table string.
pub fn format_user_table(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let headers = ["ID", "Email", "Role"];
    let id_width = column_width(headers[0], users.iter().map(|u| u.id.as_str()));
    let email_width = column_width(headers[1], users.iter().map(|u| u.email.as_str()));

    let mut lines = Vec::with_capacity(users.len() + 2);
    lines.push(format!(
        "{:<id_w$}  {:<email_w$}  {}",
        headers[0],
        headers[1],
        headers[2],
        id_w = id_width,
        email_w = email_width,
    ));
    lines.push(format!(
        "{:->id_w$}  {:->email_w$}  {:->4}",
        "",
        "",
        "",
        id_w = id_width,
        email_w = email_width,
    ));
    for user in users {
        lines.push(format!(
            "{:<id_w$}  {:<email_w$}  {}",
            user.id,
            user.email,
            user.role,
            id_w = id_width,
            email_w = email_width,
        ));
    }
    lines.join("\n")
}

/// Format dashboard statistics.
pub fn format_stats(stats: &TaskStats) -> String {
    format!(
        "Total tasks:     {}\nCompleted:       {}\nIn progress:     {}\nPending:         {}\nHigh priority:   {}\nCompletion rate: {}%",
        stats.total,
        stats.completed,
        stats.in_progress,
        stats.pending,
        stats.high_priority,
        stats.completion_rate
    )
}
