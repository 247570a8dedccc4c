//! Form state and rendering for the login/register screen and the task
//! create/edit modal.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use taskboard_client::validation::{validate_credentials, validate_title};
use taskboard_client::{ClientResult, Credentials, Priority, Status, Task, TaskDraft, TaskPatch};

/// Which auth screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => " Sign in ",
            Self::Register => " Create account ",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }
}

/// Focused field of the auth form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Email,
    Password,
}

/// Email/password form shared by login and registration.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub focus: AuthField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            AuthField::Email => AuthField::Password,
            AuthField::Password => AuthField::Email,
        };
    }

    pub fn push(&mut self, c: char) {
        match self.focus {
            AuthField::Email => self.email.push(c),
            AuthField::Password => self.password.push(c),
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        match self.focus {
            AuthField::Email => self.email.pop(),
            AuthField::Password => self.password.pop(),
        };
    }

    /// Switch between login and registration, keeping the email.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.password.clear();
        self.error = None;
    }

    /// Validated credentials ready to send.
    pub fn credentials(&self) -> ClientResult<Credentials> {
        let credentials = Credentials::new(self.email.trim(), self.password.as_str());
        validate_credentials(&credentials)?;
        Ok(credentials)
    }
}

/// Focused field of the task form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskField {
    #[default]
    Title,
    Description,
    Status,
    Priority,
}

impl TaskField {
    fn next(self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Description => Self::Status,
            Self::Status => Self::Priority,
            Self::Priority => Self::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Title => Self::Priority,
            Self::Description => Self::Title,
            Self::Status => Self::Description,
            Self::Priority => Self::Status,
        }
    }
}

/// Create/edit modal state.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    /// The task being edited; `None` when creating
    pub original: Option<Task>,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub focus: TaskField,
    pub error: Option<String>,
}

impl TaskForm {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            original: Some(task.clone()),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            ..Self::default()
        }
    }

    pub fn is_edit(&self) -> bool {
        self.original.is_some()
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn previous_field(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Type into the focused text field. Space cycles the enum fields.
    pub fn push(&mut self, c: char) {
        match self.focus {
            TaskField::Title => self.title.push(c),
            TaskField::Description => self.description.push(c),
            TaskField::Status if c == ' ' => self.cycle(true),
            TaskField::Priority if c == ' ' => self.cycle(true),
            TaskField::Status | TaskField::Priority => {}
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        match self.focus {
            TaskField::Title => {
                self.title.pop();
            }
            TaskField::Description => {
                self.description.pop();
            }
            TaskField::Status | TaskField::Priority => {}
        }
    }

    /// Step the focused status/priority field forward or back.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            TaskField::Status => {
                self.status = step(&Status::ALL, self.status, forward);
            }
            TaskField::Priority => {
                self.priority = step(&Priority::ALL, self.priority, forward);
            }
            TaskField::Title | TaskField::Description => {}
        }
    }

    fn description(&self) -> Option<String> {
        let trimmed = self.description.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Validated draft for a new task.
    pub fn draft(&self) -> ClientResult<TaskDraft> {
        validate_title(&self.title)?;
        let mut draft = TaskDraft::new(self.title.trim())
            .with_status(self.status)
            .with_priority(self.priority);
        if let Some(description) = self.description() {
            draft = draft.with_description(description);
        }
        Ok(draft)
    }

    /// Validated patch holding only the fields that changed.
    ///
    /// Returns `None` when nothing changed.
    pub fn patch(&self) -> ClientResult<Option<TaskPatch>> {
        validate_title(&self.title)?;
        let Some(original) = &self.original else {
            return Ok(None);
        };
        let title = self.title.trim();
        let patch = TaskPatch {
            title: (title != original.title).then(|| title.to_string()),
            description: (self.description() != original.description)
                .then(|| self.description.trim().to_string()),
            status: (self.status != original.status).then_some(self.status),
            priority: (self.priority != original.priority).then_some(self.priority),
        };
        Ok(patch.has_updates().then_some(patch))
    }
}

fn step<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let index = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % all.len()
    } else {
        (index + all.len() - 1) % all.len()
    };
    all[next]
}

/// A rectangle of the given size centered in `area`, clamped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{:<12}", label), label_style),
        Span::raw(format!("{}{}", value, cursor)),
    ])
}

fn error_line(error: Option<&str>) -> Line<'static> {
    match error {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(""),
    }
}

/// Lines for the auth form body.
pub fn auth_form_lines(form: &AuthForm) -> Vec<Line<'static>> {
    let masked = "*".repeat(form.password.chars().count());
    let switch_hint = match form.mode {
        AuthMode::Login => "[Ctrl+R] Create an account",
        AuthMode::Register => "[Ctrl+R] Back to sign in",
    };
    let submit = if form.submitting {
        "Submitting..."
    } else {
        "[Enter] Submit  [Tab] Next field"
    };
    vec![
        field_line("Email", &form.email, form.focus == AuthField::Email),
        field_line("Password", &masked, form.focus == AuthField::Password),
        Line::from(""),
        error_line(form.error.as_deref()),
        Line::from(Span::styled(submit, Style::default().fg(Color::Cyan))),
        Line::from(Span::styled(switch_hint, Style::default().fg(Color::DarkGray))),
    ]
}

/// Render the login/register form centered in `area`.
pub fn render_auth_form(frame: &mut Frame, area: Rect, form: &AuthForm) {
    let rect = centered_rect(56, 10, area);
    let block = Block::default()
        .title(form.mode.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Paragraph::new(auth_form_lines(form)).block(block), rect);
}

/// Lines for the task form body.
pub fn task_form_lines(form: &TaskForm) -> Vec<Line<'static>> {
    vec![
        field_line("Title", &form.title, form.focus == TaskField::Title),
        field_line(
            "Description",
            &form.description,
            form.focus == TaskField::Description,
        ),
        field_line(
            "Status",
            &format!("< {} >", form.status.label()),
            form.focus == TaskField::Status,
        ),
        field_line(
            "Priority",
            &format!("< {} >", form.priority.label()),
            form.focus == TaskField::Priority,
        ),
        Line::from(""),
        error_line(form.error.as_deref()),
        Line::from(Span::styled(
            "[Enter] Save  [Tab] Next  [Left/Right] Change  [Esc] Cancel",
            Style::default().fg(Color::Cyan),
        )),
    ]
}

/// Render the create/edit modal over `area`.
pub fn render_task_form(frame: &mut Frame, area: Rect, form: &TaskForm) {
    let rect = centered_rect(64, 11, area);
    let title = if form.is_edit() {
        " Edit task "
    } else {
        " New task "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(task_form_lines(form)).block(block), rect);
}

/// Render a yes/no confirmation modal.
pub fn render_confirm(frame: &mut Frame, area: Rect, message: &str) {
    let rect = centered_rect(message.chars().count() as u16 + 6, 5, area);
    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(block.inner(rect));
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);
    frame.render_widget(Paragraph::new(message.to_string()), chunks[0]);
    frame.render_widget(
        Paragraph::new("[y] Yes  [n] No").style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );
}
