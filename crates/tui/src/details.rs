//! Details view widget for the selected task.

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use taskboard_client::{Priority, Status, Task};

/// Render the details view for a task.
///
/// If `task` is `None`, displays "No task selected" message.
pub fn render_details_view(frame: &mut Frame, area: Rect, task: Option<&Task>, is_focused: bool) {
    let border_color = if is_focused {
        Color::Yellow
    } else {
        Color::Cyan
    };

    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    match task {
        Some(task) => {
            let paragraph = Paragraph::new(build_details_lines(task))
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        None => {
            let paragraph = Paragraph::new("No task selected")
                .block(block)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, area);
        }
    }
}

/// Build all the lines for the details view.
pub fn build_details_lines(task: &Task) -> Vec<Line<'static>> {
    let mut lines = build_header_section(task);
    lines.push(Line::from(""));

    lines.push(section_header("Description"));
    match task.description.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => {
            lines.extend(text.lines().map(|l| Line::from(format!("  {}", l))));
        }
        _ => lines.push(Line::from(Span::styled(
            "  No description",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    lines.push(Line::from(""));

    lines.extend(build_timestamps_section(task));
    lines
}

/// ID, title, and status/priority badges.
fn build_header_section(task: &Task) -> Vec<Line<'static>> {
    let id_line = Line::from(vec![
        Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            task.id.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let title_line = Line::from(Span::styled(
        task.title.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));

    let status_style = match task.status {
        Status::Pending => Style::default().fg(Color::White),
        Status::InProgress => Style::default().fg(Color::Yellow),
        Status::Completed => Style::default().fg(Color::Green),
    };

    let badges_line = Line::from(vec![
        Span::styled(format!("[{}]", task.status.label()), status_style),
        Span::raw(" "),
        format_priority(task.priority),
    ]);

    vec![id_line, title_line, badges_line]
}

/// Format priority with appropriate color.
fn format_priority(priority: Priority) -> Span<'static> {
    let color = match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    };
    Span::styled(
        format!("[{} priority]", priority.label()),
        Style::default().fg(color),
    )
}

fn build_timestamps_section(task: &Task) -> Vec<Line<'static>> {
    vec![
        section_header("Timestamps"),
        Line::from(vec![
            Span::styled("  Created: ", Style::default().fg(Color::DarkGray)),
            format_timestamp(task.created_at.as_ref()),
        ]),
        Line::from(vec![
            Span::styled("  Updated: ", Style::default().fg(Color::DarkGray)),
            format_timestamp(task.updated_at.as_ref()),
        ]),
    ]
}

/// Format a timestamp as "YYYY-MM-DD HH:MM" or "-" if None.
fn format_timestamp(timestamp: Option<&DateTime<Utc>>) -> Span<'static> {
    match timestamp {
        Some(dt) => Span::styled(
            dt.format("%Y-%m-%d %H:%M").to_string(),
            Style::default().fg(Color::White),
        ),
        None => Span::styled("-", Style::default().fg(Color::DarkGray)),
    }
}

/// Create a section header line.
fn section_header(title: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_format_timestamp_none() {
        let span = format_timestamp(None);
        assert_eq!(span.content, "-");
    }

    #[test]
    fn test_format_timestamp_some() {
        use chrono::TimeZone;
        let dt = Utc.with_ymd_and_hms(2025, 1, 6, 12, 30, 0).unwrap();
        let span = format_timestamp(Some(&dt));
        assert_eq!(span.content, "2025-01-06 12:30");
    }

    #[test]
    fn test_format_priority() {
        assert_eq!(format_priority(Priority::High).content, "[High priority]");
        assert_eq!(
            format_priority(Priority::Low).style.fg,
            Some(Color::Green)
        );
    }

    #[test]
    fn test_build_header_section() {
        let task = Task::new("t1", "Ship it").with_status(Status::InProgress);
        let lines = build_header_section(&task);
        assert_eq!(lines.len(), 3);
        assert_eq!(text(&lines[0]), "ID: t1");
        assert_eq!(text(&lines[1]), "Ship it");
        assert!(text(&lines[2]).starts_with("[In Progress]"));
    }

    #[test]
    fn test_details_without_description() {
        let lines = build_details_lines(&Task::new("t1", "Ship it"));
        assert!(lines.iter().any(|l| text(l) == "  No description"));
    }

    #[test]
    fn test_details_with_multiline_description() {
        let task = Task::new("t1", "Ship it").with_description("first\nsecond");
        let lines: Vec<String> = build_details_lines(&task).iter().map(text).collect();
        assert!(lines.contains(&"  first".to_string()));
        assert!(lines.contains(&"  second".to_string()));
        assert!(lines.contains(&"  Created: -".to_string()));
    }
}
