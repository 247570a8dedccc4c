//! Task list panel with keyboard drag-and-drop.
//!
//! Renders the ordered task list of the active filter context. The row
//! being dragged is highlighted so the user can see where it will land.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use taskboard_client::{Priority, Status, Task};

/// Display characters for the status column
mod marker {
    pub const PENDING: &str = "[ ]";
    pub const IN_PROGRESS: &str = "[>]";
    pub const COMPLETED: &str = "[x]";
    pub const GRIP: &str = "=";
}

/// How a row is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Normal,
    Selected,
    Dragging,
}

/// Everything the panel needs to draw itself
#[derive(Debug, Clone, Copy)]
pub struct TaskListView<'a> {
    pub tasks: &'a [Task],
    pub selected: usize,
    pub dragging: Option<&'a str>,
    pub loading: bool,
    pub focused: bool,
    /// Row number of the first task, for pages after the first
    pub offset: usize,
}

fn status_marker(status: Status) -> &'static str {
    match status {
        Status::Pending => marker::PENDING,
        Status::InProgress => marker::IN_PROGRESS,
        Status::Completed => marker::COMPLETED,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    }
}

/// Build the styled line for one task row.
pub fn build_task_line(task: &Task, number: usize, state: RowState) -> Line<'static> {
    let grip = if state == RowState::Dragging {
        marker::GRIP
    } else {
        " "
    };
    let row_style = match state {
        RowState::Normal => Style::default(),
        RowState::Selected => Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        RowState::Dragging => Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    };
    let priority_style = if state == RowState::Normal {
        Style::default().fg(priority_color(task.priority))
    } else {
        row_style
    };

    Line::from(vec![
        Span::styled(format!("{}{:>3}. ", grip, number), row_style),
        Span::styled(format!("{} ", status_marker(task.status)), row_style),
        Span::styled(format!("{:<6} ", task.priority.as_str()), priority_style),
        Span::styled(task.title.clone(), row_style),
    ])
}

/// Lines for every row of the list.
pub fn build_task_lines(view: &TaskListView<'_>) -> Vec<Line<'static>> {
    view.tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let state = if view.dragging == Some(task.id.as_str()) {
                RowState::Dragging
            } else if i == view.selected {
                RowState::Selected
            } else {
                RowState::Normal
            };
            build_task_line(task, view.offset + i + 1, state)
        })
        .collect()
}

/// Render the task list panel.
pub fn render_task_list(frame: &mut Frame, area: Rect, view: &TaskListView<'_>) {
    let border_color = if view.focused {
        Color::Yellow
    } else {
        Color::Cyan
    };
    let title = match (view.loading, view.dragging.is_some()) {
        (true, _) => " Tasks (loading...) ",
        (false, true) => " Tasks (moving) ",
        (false, false) => " Tasks ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    if view.tasks.is_empty() {
        let message = if view.loading {
            "Loading tasks..."
        } else {
            "No tasks found"
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    // Keep the selected row on screen
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = (view.selected + 1).saturating_sub(visible);
    let paragraph = Paragraph::new(build_task_lines(view))
        .block(block)
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    fn view(tasks: &[Task]) -> TaskListView<'_> {
        TaskListView {
            tasks,
            selected: 0,
            dragging: None,
            loading: false,
            focused: true,
            offset: 0,
        }
    }

    #[test]
    fn test_build_task_line_layout() {
        let task = Task::new("t1", "Write docs")
            .with_status(Status::InProgress)
            .with_priority(Priority::High);
        let line = build_task_line(&task, 3, RowState::Normal);
        assert_eq!(line_text(&line), "   3. [>] high   Write docs");
        assert_eq!(line.spans[2].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_dragged_row_has_grip() {
        let task = Task::new("t1", "Write docs");
        let line = build_task_line(&task, 1, RowState::Dragging);
        assert!(line_text(&line).starts_with("=  1."));
        assert_eq!(line.spans[0].style.bg, Some(Color::Yellow));
    }

    #[test]
    fn test_build_task_lines_marks_selection_and_drag() {
        let tasks = vec![
            Task::new("a", "A"),
            Task::new("b", "B"),
            Task::new("c", "C"),
        ];
        let mut v = view(&tasks);
        v.selected = 1;
        v.dragging = Some("c");
        v.offset = 10;

        let lines = build_task_lines(&v);
        assert_eq!(lines.len(), 3);
        assert!(line_text(&lines[0]).starts_with("  11."));
        assert_eq!(lines[1].spans[0].style.bg, Some(Color::Cyan));
        assert_eq!(lines[2].spans[0].style.bg, Some(Color::Yellow));
    }

    #[test]
    fn test_status_markers_are_distinct() {
        let markers = [
            status_marker(Status::Pending),
            status_marker(Status::InProgress),
            status_marker(Status::Completed),
        ];
        assert_ne!(markers[0], markers[1]);
        assert_ne!(markers[1], markers[2]);
        assert_ne!(markers[0], markers[2]);
    }
}
