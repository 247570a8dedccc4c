//! Main application state and event loop.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::KeyEvent,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use taskboard_client::{
    AuthSession, CachedPage, ClientConfig, ClientError, ClientResult, CommitDecision,
    FilterContext, MoveOutcome, Notice, Page, PendingMove, ReorderController, Role, Route, Task,
    TaskStats, User, cycle_priority, cycle_status, gate,
};

use crate::data::{ApiEvent, AuthRequest, Backend, Requests};
use crate::error::TuiResult;
use crate::event::{
    is_back_tab, is_backspace, is_char, is_ctrl, is_ctrl_c, is_down, is_enter, is_esc, is_left,
    is_quit, is_right, is_tab, is_up, poll_key, text_input,
};
use crate::form::{AuthForm, AuthMode, TaskField, TaskForm};
use crate::ui;

/// The focused part of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    /// The task list.
    #[default]
    List,
    /// The search box.
    Search,
}

impl FocusedPanel {
    pub fn is_list(self) -> bool {
        matches!(self, Self::List)
    }

    pub fn is_search(self) -> bool {
        matches!(self, Self::Search)
    }
}

/// Action run when a confirmation modal is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask(String),
    DeleteUser(String),
    SetRole(String, Role),
    AdminDeleteTask(String),
}

/// Modal dialog drawn over the current screen.
#[derive(Debug, Clone)]
pub enum Modal {
    Task(TaskForm),
    Confirm {
        message: String,
        action: ConfirmAction,
    },
}

/// A notice shown until it expires.
#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    expires_at: Instant,
}

/// State of the admin screens.
#[derive(Debug, Clone, Default)]
pub struct AdminPanel {
    pub users: Vec<User>,
    pub selected_user: usize,
    /// Tasks of the user opened from the list
    pub user_tasks: Vec<Task>,
    pub selected_task: usize,
    pub loading: bool,
}

impl AdminPanel {
    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected_user)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.user_tasks.get(self.selected_task)
    }
}

/// A task picked up for keyboard reordering.
#[derive(Debug, Clone)]
struct Drag {
    source_id: String,
    /// Order of the list when the task was picked up
    slots: Vec<String>,
    /// Index in `slots` the task is currently hovering over
    target: usize,
}

/// Main application state.
pub struct App<B: Backend> {
    requests: Requests<B>,
    events: UnboundedReceiver<ApiEvent>,
    /// Requests dispatched whose result has not been handled yet.
    outstanding: usize,
    config: ClientConfig,
    session: AuthSession,
    route: Route,
    auth_form: AuthForm,
    reorder: ReorderController,
    /// Filter whose last fetch failed; it is not retried until asked.
    failed_fetch: Option<FilterContext>,
    selected: usize,
    drag: Option<Drag>,
    focused_panel: FocusedPanel,
    search: String,
    /// Time of the last search keystroke not yet applied.
    search_edited: Option<Instant>,
    modal: Option<Modal>,
    toasts: Vec<Toast>,
    admin: AdminPanel,
    running: bool,
}

impl<B: Backend> App<B> {
    /// Create the app and start verifying the backend session.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(backend: Arc<B>, config: ClientConfig) -> Self {
        let (requests, events) = Requests::new(backend);
        let reorder = ReorderController::new(FilterContext::new().with_limit(config.page_size));
        let mut app = Self {
            requests,
            events,
            outstanding: 0,
            config,
            session: AuthSession::new(),
            route: Route::Login,
            auth_form: AuthForm::new(AuthMode::Login),
            reorder,
            failed_fetch: None,
            selected: 0,
            drag: None,
            focused_panel: FocusedPanel::default(),
            search: String::new(),
            search_edited: None,
            modal: None,
            toasts: Vec::new(),
            admin: AdminPanel::default(),
            running: true,
        };
        app.session.begin_verify();
        app.auth_form.submitting = true;
        app.request().verify();
        app
    }

    fn request(&mut self) -> &Requests<B> {
        self.outstanding += 1;
        &self.requests
    }

    /// Check if the application is still running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn auth_form(&self) -> &AuthForm {
        &self.auth_form
    }

    /// The ordered task list of the active filter.
    pub fn tasks(&self) -> &[Task] {
        self.reorder.tasks()
    }

    pub fn filter(&self) -> &FilterContext {
        self.reorder.filter()
    }

    pub fn current_page(&self) -> Option<&CachedPage> {
        self.reorder.current_page()
    }

    /// Statistics for the tasks on screen.
    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(self.reorder.tasks())
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.reorder.tasks().get(self.selected)
    }

    /// Id of the task being moved with the keyboard.
    pub fn dragging(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.source_id.as_str())
    }

    /// Whether the active list is being fetched.
    pub fn is_loading(&self) -> bool {
        self.reorder.is_fetching()
    }

    pub fn focused_panel(&self) -> FocusedPanel {
        self.focused_panel
    }

    /// Search text as typed, including edits not yet applied.
    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn admin(&self) -> &AdminPanel {
        &self.admin
    }

    /// Request the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Show a notice for the configured duration.
    pub fn toast(&mut self, notice: Notice) {
        debug!(message = %notice.message, "toast");
        self.toasts.push(Toast {
            notice,
            expires_at: Instant::now() + self.config.toast_duration,
        });
    }

    /// Advance timers: expire toasts and apply a settled search.
    pub fn tick(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
        if let Some(edited) = self.search_edited
            && now.duration_since(edited) >= self.config.search_debounce
        {
            self.apply_search();
        }
        self.maybe_refresh();
    }

    /// Wait for every outstanding request and apply its result.
    pub async fn settle(&mut self) {
        while self.outstanding > 0 {
            match self.events.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    // ----------------------------------------
    // Routing and fetching
    // ----------------------------------------

    fn navigate(&mut self, route: Route) {
        let route = gate(route, &self.session);
        debug!(path = %route.path(), "navigate");
        match &route {
            Route::Admin => {
                self.admin.loading = true;
                self.request().fetch_users();
            }
            Route::AdminUserTasks(user_id) => {
                self.admin.user_tasks.clear();
                self.admin.selected_task = 0;
                self.admin.loading = true;
                self.request().fetch_user_tasks(user_id.clone());
            }
            Route::Login | Route::Register | Route::Dashboard => {}
        }
        self.route = route;
    }

    fn fetch(&mut self) {
        let filter = self.reorder.begin_fetch();
        self.request().fetch_tasks(filter);
    }

    /// Refetch the active list when it is missing or stale.
    ///
    /// Waits while a drag or a position update is in progress so the
    /// refetch does not supersede them.
    fn maybe_refresh(&mut self) {
        if self.route != Route::Dashboard
            || self.drag.is_some()
            || self.reorder.is_fetching()
            || self.reorder.in_flight() > 0
            || !self.reorder.needs_refresh()
            || self.failed_fetch.as_ref() == Some(self.reorder.filter())
        {
            return;
        }
        self.fetch();
    }

    fn refresh(&mut self) {
        self.failed_fetch = None;
        self.reorder.invalidate_all();
        if !self.reorder.is_fetching() {
            self.fetch();
        }
    }

    fn apply_filter(&mut self, filter: FilterContext) {
        if filter == *self.reorder.filter() {
            return;
        }
        self.drag = None;
        self.selected = 0;
        self.failed_fetch = None;
        if self.reorder.set_filter(filter) {
            self.fetch();
        }
    }

    fn apply_search(&mut self) {
        self.search_edited = None;
        let mut filter = self.reorder.filter().clone();
        filter.set_search(&self.search);
        self.apply_filter(filter);
    }

    fn clamp_selection(&mut self) {
        let len = self.reorder.tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn select_task(&mut self, task_id: &str) {
        if let Some(index) = self.reorder.tasks().iter().position(|t| t.id == task_id) {
            self.selected = index;
        }
    }

    // ----------------------------------------
    // Session
    // ----------------------------------------

    fn submit_auth(&mut self) {
        match self.auth_form.credentials() {
            Ok(credentials) => {
                self.auth_form.error = None;
                self.auth_form.submitting = true;
                match self.auth_form.mode {
                    AuthMode::Login => self.request().login(credentials),
                    AuthMode::Register => self.request().register(credentials),
                }
            }
            Err(err) => self.auth_form.error = Some(err.to_string()),
        }
    }

    fn logout(&mut self) {
        info!("signing out");
        self.request().logout();
        self.sign_out_locally();
        self.toast(Notice::info("Signed out"));
    }

    /// Forget the user and everything fetched on their behalf.
    fn sign_out_locally(&mut self) {
        self.session.clear();
        self.reorder = ReorderController::new(FilterContext::new().with_limit(self.config.page_size));
        self.failed_fetch = None;
        self.selected = 0;
        self.drag = None;
        self.focused_panel = FocusedPanel::List;
        self.search.clear();
        self.search_edited = None;
        self.modal = None;
        self.admin = AdminPanel::default();
        self.auth_form = AuthForm::new(AuthMode::Login);
        self.route = Route::Login;
    }

    /// Sign out when the backend rejects the session.
    ///
    /// Returns true if `err` was an auth failure.
    fn handle_auth_failure(&mut self, err: &ClientError) -> bool {
        if !err.is_auth_failure() {
            return false;
        }
        if self.session.is_authenticated() {
            warn!("session rejected by backend");
            self.sign_out_locally();
            self.toast(Notice::error("Session expired. Please sign in again."));
        }
        true
    }

    // ----------------------------------------
    // Keyboard reordering
    // ----------------------------------------

    fn pick_up(&mut self) {
        if self.reorder.is_fetching() {
            self.toast(Notice::info("Wait for the list to finish loading"));
            return;
        }
        let Some(task) = self.selected_task() else {
            return;
        };
        let source_id = task.id.clone();
        let slots = self.reorder.tasks().iter().map(|t| t.id.clone()).collect();
        debug!(task_id = %source_id, "picked up task");
        self.drag = Some(Drag {
            source_id,
            slots,
            target: self.selected,
        });
    }

    fn move_drag(&mut self, down: bool) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        let target = if down {
            (drag.target + 1).min(drag.slots.len().saturating_sub(1))
        } else {
            drag.target.saturating_sub(1)
        };
        if target == drag.target {
            return;
        }
        let source_id = drag.source_id.clone();
        let over_id = drag.slots[target].clone();
        if self.reorder.begin_drag_move(&source_id, &over_id) {
            drag.target = target;
            self.selected = target;
        } else {
            // The list changed under the gesture
            self.cancel_drag();
        }
    }

    fn drop_drag(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let over_id = drag.slots[drag.target].clone();
        match self.reorder.commit_drag_move(&drag.source_id, &over_id) {
            CommitDecision::Pending(pending) => {
                self.request().update_position(pending);
            }
            CommitDecision::Unchanged => {}
            CommitDecision::Cancelled => self.toast(Notice::info("Move cancelled")),
        }
        self.select_task(&drag.source_id);
    }

    fn cancel_drag(&mut self) {
        self.reorder.cancel_drag_move();
        if let Some(drag) = self.drag.take() {
            self.select_task(&drag.source_id);
        }
        self.clamp_selection();
    }

    // ----------------------------------------
    // Key handling
    // ----------------------------------------

    /// Handle a keyboard event.
    pub fn handle_key(&mut self, key: &KeyEvent) {
        if is_ctrl_c(key) {
            self.quit();
            return;
        }

        if self.modal.is_some() {
            self.handle_modal_key(key);
        } else {
            match self.route.clone() {
                Route::Login | Route::Register => self.handle_auth_key(key),
                Route::Dashboard => self.handle_dashboard_key(key),
                Route::Admin => self.handle_admin_key(key),
                Route::AdminUserTasks(_) => self.handle_user_tasks_key(key),
            }
        }
        self.maybe_refresh();
    }

    fn handle_auth_key(&mut self, key: &KeyEvent) {
        if self.auth_form.submitting {
            return;
        }
        if is_ctrl(key, 'r') {
            self.auth_form.toggle_mode();
            let route = match self.auth_form.mode {
                AuthMode::Login => Route::Login,
                AuthMode::Register => Route::Register,
            };
            self.navigate(route);
        } else if is_tab(key) || is_back_tab(key) {
            self.auth_form.next_field();
        } else if is_enter(key) {
            self.submit_auth();
        } else if is_backspace(key) {
            self.auth_form.backspace();
        } else if let Some(c) = text_input(key) {
            self.auth_form.push(c);
        }
    }

    fn handle_dashboard_key(&mut self, key: &KeyEvent) {
        if self.focused_panel.is_search() {
            self.handle_search_key(key);
            return;
        }
        if self.drag.is_some() {
            if is_down(key) {
                self.move_drag(true);
            } else if is_up(key) {
                self.move_drag(false);
            } else if is_enter(key) || is_char(key, ' ') {
                self.drop_drag();
            } else if is_esc(key) {
                self.cancel_drag();
            }
            return;
        }

        let mut filter = self.reorder.filter().clone();
        if is_quit(key) {
            self.quit();
        } else if is_down(key) {
            let last = self.reorder.tasks().len().saturating_sub(1);
            self.selected = (self.selected + 1).min(last);
        } else if is_up(key) {
            self.selected = self.selected.saturating_sub(1);
        } else if is_char(key, ' ') {
            self.pick_up();
        } else if is_enter(key) || is_char(key, 'e') {
            if let Some(form) = self.selected_task().map(TaskForm::edit) {
                self.modal = Some(Modal::Task(form));
            }
        } else if is_char(key, 'a') {
            self.modal = Some(Modal::Task(TaskForm::create()));
        } else if is_char(key, 'd') {
            let confirm = self.selected_task().map(|task| Modal::Confirm {
                message: format!("Delete task \"{}\"?", task.title),
                action: ConfirmAction::DeleteTask(task.id.clone()),
            });
            if confirm.is_some() {
                self.modal = confirm;
            }
        } else if is_char(key, '/') {
            self.focused_panel = FocusedPanel::Search;
        } else if is_char(key, 's') {
            filter.set_status(cycle_status(filter.status));
            self.apply_filter(filter);
        } else if is_char(key, 'p') {
            filter.set_priority(cycle_priority(filter.priority));
            self.apply_filter(filter);
        } else if is_char(key, 'c') {
            self.search.clear();
            self.search_edited = None;
            self.apply_filter(FilterContext::new().with_limit(filter.limit));
        } else if is_right(key) || is_char(key, ']') {
            if self
                .reorder
                .current_page()
                .is_some_and(|page| page.page < page.total_pages)
            {
                self.apply_filter(filter.next_page());
            }
        } else if is_left(key) || is_char(key, '[') {
            self.apply_filter(filter.previous_page());
        } else if is_char(key, 'r') {
            self.refresh();
        } else if is_char(key, 'A') {
            if self.session.is_admin() {
                self.navigate(Route::Admin);
            } else {
                self.toast(Notice::error("Admin access required"));
            }
        } else if is_char(key, 'L') {
            self.logout();
        }
    }

    fn handle_search_key(&mut self, key: &KeyEvent) {
        if is_enter(key) || is_esc(key) || is_tab(key) {
            self.focused_panel = FocusedPanel::List;
            self.apply_search();
        } else if is_backspace(key) {
            if self.search.pop().is_some() {
                self.search_edited = Some(Instant::now());
            }
        } else if let Some(c) = text_input(key) {
            self.search.push(c);
            self.search_edited = Some(Instant::now());
        }
    }

    fn handle_admin_key(&mut self, key: &KeyEvent) {
        let last = self.admin.users.len().saturating_sub(1);
        if is_quit(key) {
            self.quit();
        } else if is_esc(key) || is_char(key, 'b') {
            self.navigate(Route::Dashboard);
        } else if is_down(key) {
            self.admin.selected_user = (self.admin.selected_user + 1).min(last);
        } else if is_up(key) {
            self.admin.selected_user = self.admin.selected_user.saturating_sub(1);
        } else if is_char(key, 'r') {
            self.refresh_admin();
        } else if let Some(user) = self.admin.selected_user().cloned() {
            if is_enter(key) {
                self.navigate(Route::AdminUserTasks(user.id));
            } else if is_char(key, 'R') {
                let role = user.role.toggled();
                self.modal = Some(Modal::Confirm {
                    message: format!("Change role of {} to {}?", user.email, role),
                    action: ConfirmAction::SetRole(user.id, role),
                });
            } else if is_char(key, 'd') {
                self.modal = Some(Modal::Confirm {
                    message: format!("Delete user {}?", user.email),
                    action: ConfirmAction::DeleteUser(user.id),
                });
            }
        }
    }

    fn handle_user_tasks_key(&mut self, key: &KeyEvent) {
        let last = self.admin.user_tasks.len().saturating_sub(1);
        if is_quit(key) {
            self.quit();
        } else if is_esc(key) || is_char(key, 'b') {
            self.navigate(Route::Admin);
        } else if is_down(key) {
            self.admin.selected_task = (self.admin.selected_task + 1).min(last);
        } else if is_up(key) {
            self.admin.selected_task = self.admin.selected_task.saturating_sub(1);
        } else if is_char(key, 'r') {
            self.refresh_admin();
        } else if is_char(key, 'd')
            && let Some(task) = self.admin.selected_task()
        {
            self.modal = Some(Modal::Confirm {
                message: format!("Delete task \"{}\"?", task.title),
                action: ConfirmAction::AdminDeleteTask(task.id.clone()),
            });
        }
    }

    fn handle_modal_key(&mut self, key: &KeyEvent) {
        let Some(modal) = self.modal.take() else {
            return;
        };
        self.modal = match modal {
            Modal::Task(form) => self.handle_task_form_key(form, key),
            Modal::Confirm { message, action } => {
                if is_char(key, 'y') || is_enter(key) {
                    self.confirm(action);
                    None
                } else if is_char(key, 'n') || is_esc(key) {
                    None
                } else {
                    Some(Modal::Confirm { message, action })
                }
            }
        };
    }

    /// Returns the form to keep it open.
    fn handle_task_form_key(&mut self, mut form: TaskForm, key: &KeyEvent) -> Option<Modal> {
        if is_esc(key) {
            return None;
        }
        if is_enter(key) {
            return self.submit_task_form(form);
        }
        let choice_field = matches!(form.focus, TaskField::Status | TaskField::Priority);
        if is_tab(key) {
            form.next_field();
        } else if is_back_tab(key) {
            form.previous_field();
        } else if choice_field && is_right(key) {
            form.cycle(true);
        } else if choice_field && is_left(key) {
            form.cycle(false);
        } else if is_backspace(key) {
            form.backspace();
        } else if let Some(c) = text_input(key) {
            form.push(c);
        }
        Some(Modal::Task(form))
    }

    fn submit_task_form(&mut self, mut form: TaskForm) -> Option<Modal> {
        let Some(original) = form.original.clone() else {
            return match form.draft() {
                Ok(draft) => {
                    self.request().create_task(draft);
                    None
                }
                Err(err) => {
                    form.error = Some(err.to_string());
                    Some(Modal::Task(form))
                }
            };
        };
        match form.patch() {
            Ok(Some(patch)) => {
                self.request().update_task(original.id, patch);
                None
            }
            Ok(None) => None,
            Err(err) => {
                form.error = Some(err.to_string());
                Some(Modal::Task(form))
            }
        }
    }

    fn confirm(&mut self, action: ConfirmAction) {
        info!(?action, "confirmed");
        match action {
            ConfirmAction::DeleteTask(id) => self.request().delete_task(id),
            ConfirmAction::DeleteUser(id) => self.request().delete_user(id),
            ConfirmAction::SetRole(id, role) => self.request().set_role(id, role),
            ConfirmAction::AdminDeleteTask(id) => self.request().admin_delete_task(id),
        }
    }

    fn refresh_admin(&mut self) {
        match self.route.clone() {
            Route::Admin => {
                self.admin.loading = true;
                self.request().fetch_users();
            }
            Route::AdminUserTasks(user_id) => {
                self.admin.loading = true;
                self.request().fetch_user_tasks(user_id);
            }
            Route::Login | Route::Register | Route::Dashboard => {}
        }
    }

    // ----------------------------------------
    // Request results
    // ----------------------------------------

    /// Apply the result of a background request.
    pub fn handle_event(&mut self, event: ApiEvent) {
        self.outstanding = self.outstanding.saturating_sub(1);
        match event {
            ApiEvent::Auth { request, result } => self.on_auth(request, result),
            ApiEvent::LoggedOut(result) => {
                if let Err(err) = result {
                    warn!(error = %err, "logout request failed");
                }
            }
            ApiEvent::TasksLoaded { filter, result } => self.on_tasks_loaded(filter, result),
            ApiEvent::PositionUpdated { pending, result } => {
                self.on_position_updated(pending, result)
            }
            ApiEvent::TaskSaved { created, result } => self.on_task_saved(created, result),
            ApiEvent::TaskDeleted { id, result } => match result {
                Ok(()) => {
                    info!(task_id = %id, "task deleted");
                    self.tasks_changed();
                    self.toast(Notice::success("Task deleted successfully!"));
                }
                Err(err) => {
                    if !self.handle_auth_failure(&err) {
                        warn!(task_id = %id, error = %err, "delete failed");
                        self.toast(Notice::error("Failed to delete task."));
                    }
                }
            },
            ApiEvent::UsersLoaded(result) => {
                self.admin.loading = false;
                match result {
                    Ok(users) => {
                        self.admin.users = users;
                        let last = self.admin.users.len().saturating_sub(1);
                        self.admin.selected_user = self.admin.selected_user.min(last);
                    }
                    Err(err) => self.admin_error(&err, "Failed to load users"),
                }
            }
            ApiEvent::UserTasksLoaded { user_id, result } => {
                if self.route != Route::AdminUserTasks(user_id) {
                    return;
                }
                self.admin.loading = false;
                match result {
                    Ok(tasks) => {
                        self.admin.user_tasks = tasks;
                        let last = self.admin.user_tasks.len().saturating_sub(1);
                        self.admin.selected_task = self.admin.selected_task.min(last);
                    }
                    Err(err) => self.admin_error(&err, "Failed to load tasks"),
                }
            }
            ApiEvent::AdminUpdated {
                done,
                failed,
                result,
            } => match result {
                Ok(()) => {
                    self.toast(Notice::success(done));
                    self.tasks_changed();
                    self.refresh_admin();
                }
                Err(err) => self.admin_error(&err, failed),
            },
        }
        self.maybe_refresh();
    }

    fn on_auth(&mut self, request: AuthRequest, result: ClientResult<User>) {
        self.auth_form.submitting = false;
        match self.session.complete(result) {
            Ok(user) => {
                info!(user = %user.email, "signed in");
                self.auth_form = AuthForm::new(AuthMode::Login);
                match request {
                    AuthRequest::Verify => {}
                    AuthRequest::Login => self.toast(Notice::success("Successfully logged in!")),
                    AuthRequest::Register => {
                        self.toast(Notice::success("Account created successfully!"))
                    }
                }
                self.navigate(Route::Dashboard);
            }
            Err(err) => match request {
                AuthRequest::Verify => {
                    debug!(error = %err, "no usable session");
                    if !err.is_auth_failure() {
                        self.auth_form.error = Some(err.full_message());
                    }
                }
                AuthRequest::Login => {
                    self.auth_form.error = Some(err.full_message());
                    self.toast(Notice::error(
                        "Login failed. Please check your credentials.",
                    ));
                }
                AuthRequest::Register => {
                    self.auth_form.error = Some(err.full_message());
                    self.toast(Notice::error("Registration failed. Please try again."));
                }
            },
        }
    }

    fn on_tasks_loaded(&mut self, filter: FilterContext, result: ClientResult<Page<Task>>) {
        let current = filter == *self.reorder.filter();
        match self.reorder.finish_fetch(filter.clone(), result) {
            Ok(()) if current => {
                self.drag = None;
                self.failed_fetch = None;
                self.clamp_selection();
                // Deleting the last task of a page leaves it empty
                if let Some(page) = self.reorder.current_page()
                    && page.tasks.is_empty()
                    && filter.page > 1
                {
                    let previous = filter.previous_page();
                    self.apply_filter(previous);
                }
            }
            Ok(()) => {}
            Err(err) => {
                if self.handle_auth_failure(&err) {
                    return;
                }
                warn!(error = %err, "failed to load tasks");
                if current {
                    self.failed_fetch = Some(filter);
                }
                self.toast(Notice::error(format!(
                    "Failed to load tasks: {}",
                    err.full_message()
                )));
            }
        }
    }

    fn on_position_updated(&mut self, pending: PendingMove, result: ClientResult<()>) {
        let rejected = matches!(result, Err(ClientError::Unauthorized));
        let task_id = pending.task_id.clone();
        let outcome = self.reorder.resolve(pending, result);
        match &outcome {
            MoveOutcome::Committed => debug!(%task_id, "position saved"),
            MoveOutcome::RolledBack(_) => {
                // The restored order no longer matches a drag in progress
                if self.drag.is_some() {
                    self.cancel_drag();
                }
                self.clamp_selection();
            }
            MoveOutcome::Superseded | MoveOutcome::RefreshRequired => {}
        }
        for notice in self.reorder.take_notices() {
            self.toast(notice);
        }
        if rejected {
            self.handle_auth_failure(&ClientError::Unauthorized);
        }
    }

    fn on_task_saved(&mut self, created: bool, result: ClientResult<Task>) {
        match result {
            Ok(task) => {
                info!(task_id = %task.id, created, "task saved");
                self.tasks_changed();
                self.toast(Notice::success(if created {
                    "Task created successfully!"
                } else {
                    "Task updated successfully!"
                }));
            }
            Err(err) => {
                if self.handle_auth_failure(&err) {
                    return;
                }
                warn!(error = %err, created, "save failed");
                self.toast(Notice::error(if created {
                    "Failed to create task."
                } else {
                    "Failed to update task."
                }));
            }
        }
    }

    /// Tasks changed at the backend; every cached list is out of date.
    fn tasks_changed(&mut self) {
        self.failed_fetch = None;
        self.reorder.invalidate_all();
    }

    fn admin_error(&mut self, err: &ClientError, message: &str) {
        self.admin.loading = false;
        if self.handle_auth_failure(err) {
            return;
        }
        warn!(error = %err, "{}", message);
        self.toast(Notice::error(message));
        if matches!(err, ClientError::Forbidden { .. }) {
            self.navigate(Route::Dashboard);
        }
    }

    // ----------------------------------------
    // Terminal
    // ----------------------------------------

    /// Run the main application loop.
    ///
    /// This initializes the terminal, runs the event loop, and ensures
    /// the terminal is restored on exit (even on panic).
    pub async fn run(&mut self) -> TuiResult<()> {
        let mut terminal = init_terminal()?;

        // Use scopeguard to ensure terminal cleanup on panic
        let _guard = scopeguard::guard((), |()| {
            let _ = restore_terminal();
        });

        let result = self.event_loop(&mut terminal).await;

        drop(_guard);

        result
    }

    /// The main event loop.
    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> TuiResult<()> {
        while self.running {
            terminal.draw(|frame| ui::draw(frame, self))?;

            if let Some(key) = poll_key(Duration::from_millis(50))? {
                self.handle_key(&key);
            }
            self.drain_events();
            self.tick(Instant::now());
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> TuiResult<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> TuiResult<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use taskboard_client::memory::{DEMO_ADMIN_EMAIL, DEMO_EMAIL, DEMO_PASSWORD};
    use taskboard_client::{AuthApi, MemoryBackend, NoticeLevel, Status, TaskApi};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App<MemoryBackend>, c: char) {
        app.handle_key(&key(KeyCode::Char(c)));
    }

    fn type_text(app: &mut App<MemoryBackend>, text: &str) {
        for c in text.chars() {
            press(app, c);
        }
    }

    fn titles(app: &App<MemoryBackend>) -> Vec<String> {
        app.tasks().iter().map(|t| t.title.clone()).collect()
    }

    fn messages(app: &App<MemoryBackend>) -> Vec<String> {
        app.toasts()
            .iter()
            .map(|t| t.notice.message.clone())
            .collect()
    }

    /// App on the dashboard with tasks A..D loaded.
    async fn dashboard() -> App<MemoryBackend> {
        let backend = MemoryBackend::signed_in();
        backend.seed_tasks(vec![
            Task::new("a", "A"),
            Task::new("b", "B"),
            Task::new("c", "C"),
            Task::new("d", "D"),
        ]);
        let mut app = App::new(Arc::new(backend), ClientConfig::default());
        app.settle().await;
        app
    }

    async fn signed_out_demo() -> App<MemoryBackend> {
        let mut app = App::new(
            Arc::new(MemoryBackend::with_demo_data()),
            ClientConfig::default(),
        );
        app.settle().await;
        app
    }

    async fn login(app: &mut App<MemoryBackend>, email: &str) {
        type_text(app, email);
        app.handle_key(&key(KeyCode::Tab));
        type_text(app, DEMO_PASSWORD);
        app.handle_key(&key(KeyCode::Enter));
        app.settle().await;
    }

    #[test]
    fn test_focused_panel_default() {
        assert_eq!(FocusedPanel::default(), FocusedPanel::List);
        assert!(FocusedPanel::List.is_list());
        assert!(FocusedPanel::Search.is_search());
    }

    #[tokio::test]
    async fn test_startup_without_session_shows_login() {
        let app = signed_out_demo().await;
        assert_eq!(app.route(), &Route::Login);
        assert!(!app.auth_form().submitting);
        assert!(app.auth_form().error.is_none());
    }

    #[tokio::test]
    async fn test_startup_with_session_loads_dashboard() {
        let app = dashboard().await;
        assert_eq!(app.route(), &Route::Dashboard);
        assert_eq!(titles(&app), vec!["A", "B", "C", "D"]);
        assert_eq!(app.stats().total, 4);
    }

    #[tokio::test]
    async fn test_login_flow() {
        let mut app = signed_out_demo().await;
        login(&mut app, DEMO_EMAIL).await;

        assert_eq!(app.route(), &Route::Dashboard);
        assert_eq!(app.tasks().len(), 10);
        assert!(messages(&app).contains(&"Successfully logged in!".to_string()));
    }

    #[tokio::test]
    async fn test_login_validation_error_sends_nothing() {
        let mut app = signed_out_demo().await;
        type_text(&mut app, "not-an-email");
        app.handle_key(&key(KeyCode::Enter));

        assert!(!app.auth_form().submitting);
        assert_eq!(
            app.auth_form().error.as_deref(),
            Some("Email must be a valid email")
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut app = signed_out_demo().await;
        type_text(&mut app, DEMO_EMAIL);
        app.handle_key(&key(KeyCode::Tab));
        type_text(&mut app, "wrong-password");
        app.handle_key(&key(KeyCode::Enter));
        app.settle().await;

        assert_eq!(app.route(), &Route::Login);
        assert!(app.auth_form().error.is_some());
        assert!(
            messages(&app).contains(&"Login failed. Please check your credentials.".to_string())
        );
    }

    #[tokio::test]
    async fn test_ctrl_r_switches_to_register() {
        let mut app = signed_out_demo().await;
        app.handle_key(&KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(app.route(), &Route::Register);
        assert_eq!(app.auth_form().mode, AuthMode::Register);

        type_text(&mut app, "new@example.com");
        app.handle_key(&key(KeyCode::Tab));
        type_text(&mut app, "secret1");
        app.handle_key(&key(KeyCode::Enter));
        app.settle().await;

        assert_eq!(app.route(), &Route::Dashboard);
        assert!(app.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_keyboard_drag_moves_and_persists() {
        let mut app = dashboard().await;

        // Pick up D and carry it to the top
        for _ in 0..3 {
            press(&mut app, 'j');
        }
        press(&mut app, ' ');
        assert_eq!(app.dragging(), Some("d"));
        for _ in 0..3 {
            press(&mut app, 'k');
        }
        assert_eq!(titles(&app), vec!["D", "A", "B", "C"]);
        app.handle_key(&key(KeyCode::Enter));
        assert_eq!(app.dragging(), None);
        assert_eq!(app.selected_index(), 0);

        app.settle().await;
        assert_eq!(titles(&app), vec!["D", "A", "B", "C"]);
        let calls = app.requests.backend().position_calls();
        assert_eq!(calls, vec![("d".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_drag_rolls_back_on_failure() {
        let mut app = dashboard().await;
        app.requests.backend().fail_position_updates(true);

        press(&mut app, ' ');
        press(&mut app, 'j');
        press(&mut app, 'j');
        assert_eq!(titles(&app), vec!["B", "C", "A", "D"]);
        press(&mut app, ' ');
        assert_eq!(titles(&app), vec!["B", "C", "A", "D"]);

        app.settle().await;
        assert_eq!(titles(&app), vec!["A", "B", "C", "D"]);
        let errors: Vec<_> = app
            .toasts()
            .iter()
            .filter(|t| t.notice.level == NoticeLevel::Error)
            .map(|t| t.notice.message.as_str())
            .collect();
        assert_eq!(errors, vec!["Failed to update position"]);
    }

    #[tokio::test]
    async fn test_drag_cancel_restores_order() {
        let mut app = dashboard().await;
        press(&mut app, ' ');
        press(&mut app, 'j');
        assert_eq!(titles(&app), vec!["B", "A", "C", "D"]);

        app.handle_key(&key(KeyCode::Esc));
        assert_eq!(titles(&app), vec!["A", "B", "C", "D"]);
        assert_eq!(app.dragging(), None);
        assert_eq!(app.selected_index(), 0);
        app.settle().await;
        assert!(app.requests.backend().position_calls().is_empty());
    }

    #[tokio::test]
    async fn test_drop_in_place_sends_nothing() {
        let mut app = dashboard().await;
        press(&mut app, 'j');
        press(&mut app, ' ');
        press(&mut app, 'j');
        press(&mut app, 'k');
        press(&mut app, ' ');
        app.settle().await;

        assert_eq!(titles(&app), vec!["A", "B", "C", "D"]);
        assert!(app.requests.backend().position_calls().is_empty());
    }

    #[tokio::test]
    async fn test_pick_up_refused_while_loading() {
        let mut app = dashboard().await;
        press(&mut app, 'r');
        assert!(app.is_loading());
        press(&mut app, ' ');
        assert_eq!(app.dragging(), None);
        app.settle().await;
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_status_filter_cycles_and_fetches() {
        let backend = MemoryBackend::signed_in();
        backend.seed_tasks(vec![
            Task::new("a", "A").with_status(Status::Completed),
            Task::new("b", "B"),
        ]);
        let mut app = App::new(Arc::new(backend), ClientConfig::default());
        app.settle().await;

        press(&mut app, 's');
        assert_eq!(app.filter().status, Some(Status::Pending));
        app.settle().await;
        assert_eq!(titles(&app), vec!["B"]);

        press(&mut app, 'c');
        app.settle().await;
        assert_eq!(app.filter().status, None);
        assert_eq!(titles(&app), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_search_is_debounced() {
        let mut app = dashboard().await;
        press(&mut app, '/');
        assert!(app.focused_panel().is_search());
        type_text(&mut app, "c");
        assert_eq!(app.search_text(), "c");
        assert_eq!(app.filter().search(), None);

        app.tick(Instant::now());
        assert_eq!(app.filter().search(), None);

        app.tick(Instant::now() + Duration::from_secs(1));
        assert_eq!(app.filter().search(), Some("c"));
        app.settle().await;
        assert_eq!(titles(&app), vec!["C"]);
    }

    #[tokio::test]
    async fn test_search_enter_applies_immediately() {
        let mut app = dashboard().await;
        press(&mut app, '/');
        type_text(&mut app, "b");
        app.handle_key(&key(KeyCode::Enter));

        assert!(app.focused_panel().is_list());
        assert_eq!(app.filter().search(), Some("b"));
        app.settle().await;
        assert_eq!(titles(&app), vec!["B"]);
    }

    #[tokio::test]
    async fn test_pagination_keys() {
        let mut app = signed_out_demo().await;
        login(&mut app, DEMO_EMAIL).await;

        app.handle_key(&key(KeyCode::Right));
        app.settle().await;
        assert_eq!(app.filter().page, 2);
        assert_eq!(app.tasks().len(), 2);

        // No page 3
        app.handle_key(&key(KeyCode::Right));
        assert_eq!(app.filter().page, 2);

        app.handle_key(&key(KeyCode::Left));
        app.settle().await;
        assert_eq!(app.filter().page, 1);
        assert_eq!(app.tasks().len(), 10);
    }

    #[tokio::test]
    async fn test_create_task_through_form() {
        let mut app = dashboard().await;
        press(&mut app, 'a');
        assert!(matches!(app.modal(), Some(Modal::Task(_))));

        app.handle_key(&key(KeyCode::Enter));
        match app.modal() {
            Some(Modal::Task(form)) => {
                assert_eq!(form.error.as_deref(), Some("Title is required"))
            }
            other => panic!("expected task form, got {:?}", other),
        }

        type_text(&mut app, "E");
        app.handle_key(&key(KeyCode::Enter));
        assert!(app.modal().is_none());
        app.settle().await;

        assert_eq!(titles(&app), vec!["A", "B", "C", "D", "E"]);
        assert!(messages(&app).contains(&"Task created successfully!".to_string()));
    }

    #[tokio::test]
    async fn test_edit_task_changes_status() {
        let mut app = dashboard().await;
        press(&mut app, 'e');
        app.handle_key(&key(KeyCode::Tab));
        app.handle_key(&key(KeyCode::Tab));
        app.handle_key(&key(KeyCode::Right));
        app.handle_key(&key(KeyCode::Enter));
        app.settle().await;

        assert_eq!(app.tasks()[0].status, Status::InProgress);
        assert!(messages(&app).contains(&"Task updated successfully!".to_string()));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut app = dashboard().await;
        press(&mut app, 'd');
        press(&mut app, 'n');
        assert!(app.modal().is_none());
        app.settle().await;
        assert_eq!(app.tasks().len(), 4);

        press(&mut app, 'd');
        match app.modal() {
            Some(Modal::Confirm { message, .. }) => assert_eq!(message, "Delete task \"A\"?"),
            other => panic!("expected confirmation, got {:?}", other),
        }
        press(&mut app, 'y');
        app.settle().await;
        assert_eq!(titles(&app), vec!["B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_toasts_expire() {
        let mut app = dashboard().await;
        app.toast(Notice::info("hello"));
        app.tick(Instant::now());
        assert_eq!(messages(&app), vec!["hello"]);
        app.tick(Instant::now() + Duration::from_secs(60));
        assert!(app.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_admin_panel_requires_admin() {
        let mut app = signed_out_demo().await;
        login(&mut app, DEMO_EMAIL).await;
        press(&mut app, 'A');
        assert_eq!(app.route(), &Route::Dashboard);
        assert!(messages(&app).contains(&"Admin access required".to_string()));
    }

    #[tokio::test]
    async fn test_admin_views_user_tasks_and_deletes() {
        let mut app = signed_out_demo().await;
        login(&mut app, DEMO_ADMIN_EMAIL).await;

        press(&mut app, 'A');
        app.settle().await;
        assert_eq!(app.route(), &Route::Admin);
        assert_eq!(app.admin().users.len(), 2);
        assert_eq!(app.admin().selected_user().unwrap().email, DEMO_EMAIL);

        app.handle_key(&key(KeyCode::Enter));
        app.settle().await;
        let demo_id = app.admin().users[0].id.clone();
        assert_eq!(app.route(), &Route::AdminUserTasks(demo_id.clone()));
        assert_eq!(app.admin().user_tasks.len(), 12);

        press(&mut app, 'd');
        press(&mut app, 'y');
        app.settle().await;
        assert_eq!(app.admin().user_tasks.len(), 11);
        assert!(messages(&app).contains(&"Task deleted successfully!".to_string()));

        app.handle_key(&key(KeyCode::Esc));
        app.settle().await;
        assert_eq!(app.route(), &Route::Admin);
    }

    #[tokio::test]
    async fn test_admin_role_toggle() {
        let mut app = signed_out_demo().await;
        login(&mut app, DEMO_ADMIN_EMAIL).await;
        press(&mut app, 'A');
        app.settle().await;

        press(&mut app, 'R');
        match app.modal() {
            Some(Modal::Confirm { action, .. }) => {
                assert!(matches!(action, ConfirmAction::SetRole(_, Role::Admin)))
            }
            other => panic!("expected confirmation, got {:?}", other),
        }
        press(&mut app, 'y');
        app.settle().await;

        assert_eq!(app.admin().users[0].role, Role::Admin);
        assert!(messages(&app).contains(&"User role updated successfully".to_string()));
    }

    #[tokio::test]
    async fn test_forbidden_admin_load_returns_to_dashboard() {
        let mut app = signed_out_demo().await;
        login(&mut app, DEMO_ADMIN_EMAIL).await;
        press(&mut app, 'A');
        app.settle().await;
        assert_eq!(app.route(), &Route::Admin);

        app.handle_event(ApiEvent::UsersLoaded(Err(ClientError::Forbidden {
            message: "Admin access required".to_string(),
        })));

        assert_eq!(app.route(), &Route::Dashboard);
        assert!(!app.admin().loading);
        assert!(messages(&app).contains(&"Failed to load users".to_string()));
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let mut app = dashboard().await;
        press(&mut app, 'L');
        assert_eq!(app.route(), &Route::Login);
        assert!(app.tasks().is_empty());
        app.settle().await;
        assert!(!app.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_session_rejected_mid_use_signs_out() {
        let mut app = dashboard().await;
        // End the backend session behind the app's back
        app.requests.backend().logout().await.unwrap();

        press(&mut app, 'r');
        app.settle().await;
        assert_eq!(app.route(), &Route::Login);
        assert!(messages(&app).contains(&"Session expired. Please sign in again.".to_string()));
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = dashboard().await;
        press(&mut app, 'q');
        assert!(!app.is_running());

        let mut app = signed_out_demo().await;
        // 'q' is text on the login form
        press(&mut app, 'q');
        assert!(app.is_running());
        app.handle_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn test_refresh_after_commit_keeps_order() {
        let mut app = dashboard().await;
        press(&mut app, ' ');
        press(&mut app, 'j');
        press(&mut app, ' ');
        app.settle().await;

        // The committed entry is refetched from the backend
        assert!(!app.reorder.needs_refresh());
        assert_eq!(titles(&app), vec!["B", "A", "C", "D"]);
        let stored = app.requests.backend().list(app.filter()).await.unwrap();
        let ids: Vec<_> = stored.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c", "d"]);
    }
}
