//! UI rendering for the TUI.
//!
//! Provides layout and widget rendering using ratatui.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use taskboard_client::{NoticeLevel, Route, TaskStats, User};

use crate::app::{App, Modal, Toast};
use crate::data::Backend;
use crate::details::render_details_view;
use crate::form::{render_auth_form, render_confirm, render_task_form};
use crate::task_list::{TaskListView, render_task_list};

/// Legend text for keyboard shortcuts, per screen.
mod legend {
    pub const AUTH: &str = " [Tab] Next field  [Enter] Submit  [Ctrl+R] Sign in/Register  [Ctrl+C] Quit ";
    pub const DASHBOARD: &str = " [j/k] Select  [Space] Move  [a] Add  [e] Edit  [d] Delete  [/] Search  [s/p] Filter  [c] Clear  [Left/Right] Page  [A] Admin  [L] Logout  [q] Quit ";
    pub const DRAGGING: &str = " [j/k] Move task  [Enter/Space] Drop  [Esc] Cancel ";
    pub const SEARCH: &str = " Type to search  [Enter] Apply  [Esc] Back to list ";
    pub const ADMIN: &str = " [j/k] Select  [Enter] View tasks  [R] Toggle role  [d] Delete user  [r] Refresh  [Esc] Dashboard  [q] Quit ";
    pub const USER_TASKS: &str =
        " [j/k] Select  [d] Delete task  [r] Refresh  [Esc] Users  [q] Quit ";
}

/// Draw the entire UI.
pub fn draw<B: Backend>(frame: &mut Frame, app: &App<B>) {
    let chunks = create_main_layout(frame.area());

    draw_header(frame, chunks[0], app);
    match app.route() {
        Route::Login | Route::Register => render_auth_form(frame, chunks[1], app.auth_form()),
        Route::Dashboard => draw_dashboard(frame, chunks[1], app),
        Route::Admin => draw_users(frame, chunks[1], app),
        Route::AdminUserTasks(_) => draw_user_tasks(frame, chunks[1], app),
    }
    draw_legend(frame, chunks[2], legend_for(app));

    match app.modal() {
        Some(Modal::Task(form)) => render_task_form(frame, chunks[1], form),
        Some(Modal::Confirm { message, .. }) => render_confirm(frame, chunks[1], message),
        None => {}
    }
    draw_toasts(frame, chunks[1], app.toasts());
}

/// Create the main three-part layout: header, body, legend.
fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with statistics
            Constraint::Min(0),    // Screen body
            Constraint::Length(1), // Legend bar
        ])
        .split(area)
        .to_vec()
}

/// Split the dashboard body into the filter bar, list and details.
fn create_dashboard_layout(area: Rect) -> Vec<Rect> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    vec![rows[0], columns[0], columns[1]]
}

fn legend_for<B: Backend>(app: &App<B>) -> &'static str {
    match app.route() {
        Route::Login | Route::Register => legend::AUTH,
        Route::Dashboard if app.dragging().is_some() => legend::DRAGGING,
        Route::Dashboard if app.focused_panel().is_search() => legend::SEARCH,
        Route::Dashboard => legend::DASHBOARD,
        Route::Admin => legend::ADMIN,
        Route::AdminUserTasks(_) => legend::USER_TASKS,
    }
}

/// One-line summary of the statistics header.
fn stats_line(stats: &TaskStats) -> Line<'static> {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    for (name, count) in [
        ("Total", stats.total),
        ("Completed", stats.completed),
        ("In progress", stats.in_progress),
        ("Pending", stats.pending),
        ("High priority", stats.high_priority),
    ] {
        spans.push(Span::styled(format!("{}: ", name), label));
        spans.push(Span::styled(format!("{}  ", count), value));
    }
    spans.push(Span::styled("Completion: ", label));
    spans.push(Span::styled(
        format!("{}%", stats.completion_rate),
        Style::default().fg(Color::Green),
    ));
    Line::from(spans)
}

fn draw_header<B: Backend>(frame: &mut Frame, area: Rect, app: &App<B>) {
    let title = match app.session().user() {
        Some(user) => format!(" Taskboard - {} ({}) ", user.email, user.role.as_str()),
        None => " Taskboard ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let line = match app.route() {
        Route::Dashboard => stats_line(&app.stats()),
        Route::Admin | Route::AdminUserTasks(_) => Line::from("Admin panel"),
        Route::Login | Route::Register => Line::from(Span::styled(
            "Sign in to manage your tasks",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Search box, active filters, and the page indicator.
fn filter_line<B: Backend>(app: &App<B>) -> Line<'static> {
    let filter = app.filter();
    let searching = app.focused_panel().is_search();
    let search_style = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if searching { "_" } else { "" };
    let page = match app.current_page() {
        Some(page) => format!(
            "Page {} of {} ({} tasks)",
            page.page,
            page.total_pages.max(1),
            page.total
        ),
        None => format!("Page {}", filter.page),
    };
    let label = Style::default().fg(Color::DarkGray);

    Line::from(vec![
        Span::styled("Search: ", label),
        Span::styled(format!("{}{}", app.search_text(), cursor), search_style),
        Span::raw("   "),
        Span::styled("Status: ", label),
        Span::raw(filter.status.map_or("All", |s| s.label()).to_string()),
        Span::raw("   "),
        Span::styled("Priority: ", label),
        Span::raw(filter.priority.map_or("All", |p| p.label()).to_string()),
        Span::raw("   "),
        Span::styled(page, Style::default().fg(Color::Cyan)),
    ])
}

fn draw_dashboard<B: Backend>(frame: &mut Frame, area: Rect, app: &App<B>) {
    let chunks = create_dashboard_layout(area);
    let searching = app.focused_panel().is_search();

    let filter_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if searching {
            Color::Yellow
        } else {
            Color::Cyan
        }));
    frame.render_widget(Paragraph::new(filter_line(app)).block(filter_block), chunks[0]);

    let filter = app.filter();
    let offset = (filter.page.saturating_sub(1) as usize).saturating_mul(filter.limit as usize);
    let view = TaskListView {
        tasks: app.tasks(),
        selected: app.selected_index(),
        dragging: app.dragging(),
        loading: app.is_loading(),
        focused: !searching,
        offset,
    };
    render_task_list(frame, chunks[1], &view);
    render_details_view(frame, chunks[2], app.selected_task(), false);
}

/// Lines for the admin user list.
fn build_user_lines(users: &[User], selected: usize) -> Vec<Line<'static>> {
    users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let style = if i == selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let role_style = if i != selected && user.is_admin() {
                Style::default().fg(Color::Yellow)
            } else {
                style
            };
            Line::from(vec![
                Span::styled(format!(" {:<36} ", user.email), style),
                Span::styled(format!("{:<6} ", user.role.as_str()), role_style),
                Span::styled(user.id.clone(), style),
            ])
        })
        .collect()
}

fn draw_users<B: Backend>(frame: &mut Frame, area: Rect, app: &App<B>) {
    let admin = app.admin();
    let title = if admin.loading {
        " Users (loading...) "
    } else {
        " Users "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    if admin.users.is_empty() {
        let paragraph = Paragraph::new("No users found")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }
    let paragraph = Paragraph::new(build_user_lines(&admin.users, admin.selected_user)).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_user_tasks<B: Backend>(frame: &mut Frame, area: Rect, app: &App<B>) {
    let admin = app.admin();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    let view = TaskListView {
        tasks: &admin.user_tasks,
        selected: admin.selected_task,
        dragging: None,
        loading: admin.loading,
        focused: true,
        offset: 0,
    };
    render_task_list(frame, columns[0], &view);
    render_details_view(frame, columns[1], admin.selected_task(), false);
}

fn toast_style(level: NoticeLevel) -> Style {
    let color = match level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Error => Color::Red,
    };
    Style::default().fg(color)
}

/// Stack the live toasts in the bottom-right corner of `area`.
fn draw_toasts(frame: &mut Frame, area: Rect, toasts: &[Toast]) {
    if toasts.is_empty() {
        return;
    }
    let width = toasts
        .iter()
        .map(|t| t.notice.message.chars().count() + 4)
        .max()
        .unwrap_or(0)
        .min(area.width as usize) as u16;
    let height = (toasts.len() as u16 + 2).min(area.height);
    let rect = Rect::new(
        area.x + area.width - width,
        area.y + area.height - height,
        width,
        height,
    );
    let lines: Vec<Line> = toasts
        .iter()
        .map(|t| Line::from(Span::styled(t.notice.message.clone(), toast_style(t.notice.level))))
        .collect();
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        rect,
    );
}

/// Draw the legend bar at the bottom.
fn draw_legend(frame: &mut Frame, area: Rect, text: &'static str) {
    let legend = Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::Cyan));

    frame.render_widget(legend, area);
}
