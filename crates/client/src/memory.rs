//! In-process backend
//!
//! `MemoryBackend` implements every API trait against state held in a
//! mutex. It mirrors the HTTP backend's rules (session required, tasks
//! scoped to their owner, admin-only endpoints) and is used by the test
//! suites and by the TUI's offline mode.
//!
//! A position is a rank within the page the client was shown. The backend
//! remembers, for each task, the filter context of the last listing that
//! returned it and resolves the rank against that page. Tasks never listed
//! fall back to a rank among all of the owner's tasks.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::debug;

use crate::api::{AdminApi, AuthApi, TaskApi};
use crate::error::{ClientError, ClientResult};
use crate::filter::FilterContext;
use crate::models::{Credentials, Page, Priority, Role, Status, Task, TaskDraft, TaskPatch, User};
use crate::validation::{validate_credentials, validate_draft, validate_patch};

/// Email of the regular demo account
pub const DEMO_EMAIL: &str = "demo@taskboard.local";
/// Email of the admin demo account
pub const DEMO_ADMIN_EMAIL: &str = "admin@taskboard.local";
/// Password shared by both demo accounts
pub const DEMO_PASSWORD: &str = "password";

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: Vec<Account>,
    session: Option<String>,
    tasks: Vec<Task>,
    next_id: u64,
    fail_positions: bool,
    position_calls: Vec<(String, u32)>,
    /// Filter context of the last listing that returned each task
    listed_on: HashMap<String, FilterContext>,
}

impl MemoryState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn add_account(&mut self, email: &str, password: &str, role: Role) -> User {
        let id = self.next_id("user");
        let user = User::new(id, email).with_role(role);
        self.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    fn current_user(&self) -> ClientResult<User> {
        let id = self.session.as_deref().ok_or(ClientError::Unauthorized)?;
        self.accounts
            .iter()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
            .ok_or(ClientError::Unauthorized)
    }

    fn require_admin(&self) -> ClientResult<User> {
        let user = self.current_user()?;
        if !user.is_admin() {
            return Err(ClientError::Forbidden {
                message: "Admin access required".to_string(),
            });
        }
        Ok(user)
    }

    /// Index of a task the session user may modify (owner or admin)
    fn writable_task(&self, user: &User, id: &str) -> ClientResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id && (t.user_id == user.id || user.is_admin()))
            .ok_or_else(|| ClientError::NotFound {
                resource: "Task",
                id: id.to_string(),
            })
    }

    fn account_index(&self, user_id: &str) -> ClientResult<usize> {
        self.accounts
            .iter()
            .position(|a| a.user.id == user_id)
            .ok_or_else(|| ClientError::NotFound {
                resource: "User",
                id: user_id.to_string(),
            })
    }
}

/// Backend that keeps all state in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    /// Empty backend with no accounts and no session
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with the demo account already logged in
    pub fn signed_in() -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            let user = state.add_account(DEMO_EMAIL, DEMO_PASSWORD, Role::User);
            state.session = Some(user.id);
        }
        backend
    }

    /// Backend with both demo accounts and a set of sample tasks.
    ///
    /// Nobody is logged in; use `DEMO_EMAIL` or `DEMO_ADMIN_EMAIL` with
    /// `DEMO_PASSWORD`.
    pub fn with_demo_data() -> Self {
        let backend = Self::new();
        {
            let mut state = backend.lock();
            let demo = state.add_account(DEMO_EMAIL, DEMO_PASSWORD, Role::User);
            let admin = state.add_account(DEMO_ADMIN_EMAIL, DEMO_PASSWORD, Role::Admin);

            let samples = [
                ("Finish documentation", Status::Pending, Priority::High),
                ("Review pull requests", Status::InProgress, Priority::Medium),
                ("Plan sprint", Status::Completed, Priority::Low),
                ("Fix login redirect", Status::InProgress, Priority::High),
                ("Update dependencies", Status::Pending, Priority::Low),
                ("Write release notes", Status::Pending, Priority::Medium),
                ("Triage bug reports", Status::Completed, Priority::Medium),
                ("Prepare demo", Status::Pending, Priority::High),
                ("Clean up feature flags", Status::Pending, Priority::Low),
                ("Benchmark search", Status::InProgress, Priority::Medium),
                ("Archive old projects", Status::Completed, Priority::Low),
                ("Refine onboarding copy", Status::Pending, Priority::Medium),
            ];
            for (title, status, priority) in samples {
                let id = state.next_id("task");
                let task = Task::new(id, title)
                    .with_status(status)
                    .with_priority(priority)
                    .with_user(demo.id.clone());
                state.tasks.push(stamped(task));
            }
            let id = state.next_id("task");
            let task = Task::new(id, "Audit user roles")
                .with_description("Check that only staff hold the admin role.")
                .with_priority(Priority::High)
                .with_user(admin.id);
            state.tasks.push(stamped(task));
        }
        backend
    }

    /// Create an account without logging in.
    pub fn add_account(&self, email: &str, password: &str, role: Role) -> User {
        self.lock().add_account(email, password, role)
    }

    /// Append tasks in order. Tasks without an owner go to the session user.
    pub fn seed_tasks(&self, tasks: Vec<Task>) {
        let mut state = self.lock();
        let owner = state.session.clone().unwrap_or_default();
        for mut task in tasks {
            if task.user_id.is_empty() {
                task.user_id = owner.clone();
            }
            state.tasks.push(task);
        }
    }

    /// Make every subsequent position update fail.
    pub fn fail_position_updates(&self, fail: bool) {
        self.lock().fail_positions = fail;
    }

    /// Every `update_position` call received so far
    pub fn position_calls(&self) -> Vec<(String, u32)> {
        self.lock().position_calls.clone()
    }

    /// All stored tasks in stored order
    pub fn all_tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn stamped(mut task: Task) -> Task {
    let now = Utc::now();
    task.created_at = Some(now);
    task.updated_at = Some(now);
    task
}

/// Index of the first task on the filter's page
fn page_start(filter: &FilterContext) -> usize {
    (filter.page.saturating_sub(1) as usize).saturating_mul(filter.limit as usize)
}

fn matches_filter(task: &Task, filter: &FilterContext) -> bool {
    if filter.status.is_some_and(|s| s != task.status) {
        return false;
    }
    if filter.priority.is_some_and(|p| p != task.priority) {
        return false;
    }
    match filter.search() {
        Some(search) => {
            let needle = search.to_lowercase();
            task.title.to_lowercase().contains(&needle)
                || task
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        }
        None => true,
    }
}

impl TaskApi for MemoryBackend {
    async fn list(&self, filter: &FilterContext) -> ClientResult<Page<Task>> {
        let mut state = self.lock();
        let user = state.current_user()?;

        let matching: Vec<&Task> = state
            .tasks
            .iter()
            .filter(|t| t.user_id == user.id && matches_filter(t, filter))
            .collect();
        let total = u32::try_from(matching.len()).unwrap_or(u32::MAX);

        let items: Vec<Task> = matching
            .into_iter()
            .skip(page_start(filter))
            .take(filter.limit as usize)
            .enumerate()
            .map(|(rank, task)| {
                let mut task = task.clone();
                task.position = u32::try_from(rank).ok();
                task
            })
            .collect();

        for task in &items {
            state.listed_on.insert(task.id.clone(), filter.clone());
        }
        Ok(Page::from_items(items, filter.page, filter.limit, total))
    }

    async fn create(&self, draft: &TaskDraft) -> ClientResult<Task> {
        validate_draft(draft)?;
        let mut state = self.lock();
        let user = state.current_user()?;

        let id = state.next_id("task");
        let mut task = Task::new(id, draft.title.trim())
            .with_status(draft.status)
            .with_priority(draft.priority)
            .with_user(user.id);
        task.description = draft.description.clone();
        let task = stamped(task);
        state.tasks.push(task.clone());
        debug!(task_id = %task.id, "memory backend created task");
        Ok(task)
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> ClientResult<Task> {
        validate_patch(patch)?;
        let mut state = self.lock();
        let user = state.current_user()?;
        let index = state.writable_task(&user, id)?;

        let task = &mut state.tasks[index];
        patch.apply_to(task);
        task.updated_at = Some(Utc::now());
        Ok(task.clone())
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        let mut state = self.lock();
        let user = state.current_user()?;
        let index = state.writable_task(&user, id)?;
        state.tasks.remove(index);
        Ok(())
    }

    async fn update_position(&self, id: &str, position: u32) -> ClientResult<()> {
        let mut state = self.lock();
        state.position_calls.push((id.to_string(), position));
        if state.fail_positions {
            return Err(ClientError::Status {
                code: 500,
                message: "Failed to update position".to_string(),
            });
        }

        let user = state.current_user()?;
        let index = state.writable_task(&user, id)?;
        let owner = state.tasks[index].user_id.clone();
        let filter = state.listed_on.get(id).cloned();

        // Storage slots of the list the rank refers to
        let slots: Vec<usize> = state
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                t.user_id == owner && filter.as_ref().is_none_or(|f| matches_filter(t, f))
            })
            .map(|(i, _)| i)
            .collect();
        let mut ordered: Vec<Task> = slots.iter().map(|i| state.tasks[*i].clone()).collect();
        let Some(from) = ordered.iter().position(|t| t.id == id) else {
            return Ok(());
        };
        let task = ordered.remove(from);
        let to = match &filter {
            Some(f) => {
                let start = page_start(f);
                let last = start.saturating_add((f.limit as usize).saturating_sub(1));
                start.saturating_add(position as usize).min(last)
            }
            None => position as usize,
        };
        ordered.insert(to.min(ordered.len()), task);

        for (slot, task) in slots.into_iter().zip(ordered) {
            state.tasks[slot] = task;
        }
        Ok(())
    }
}

impl AuthApi for MemoryBackend {
    async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        let mut state = self.lock();
        let email = credentials.email.trim();
        let account = state
            .accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email) && a.password == credentials.password)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                code: 401,
                message: "Invalid email or password".to_string(),
            })?;
        state.session = Some(account.user.id.clone());
        Ok(account.user)
    }

    async fn register(&self, credentials: &Credentials) -> ClientResult<User> {
        validate_credentials(credentials)?;
        let mut state = self.lock();
        let email = credentials.email.trim();
        if state
            .accounts
            .iter()
            .any(|a| a.user.email.eq_ignore_ascii_case(email))
        {
            return Err(ClientError::Status {
                code: 409,
                message: "User already exists".to_string(),
            });
        }
        let user = state.add_account(email, &credentials.password, Role::User);
        state.session = Some(user.id.clone());
        Ok(user)
    }

    async fn logout(&self) -> ClientResult<()> {
        self.lock().session = None;
        Ok(())
    }

    async fn verify(&self) -> ClientResult<User> {
        self.lock().current_user()
    }
}

impl AdminApi for MemoryBackend {
    async fn list_users(&self) -> ClientResult<Vec<User>> {
        let state = self.lock();
        state.require_admin()?;
        Ok(state.accounts.iter().map(|a| a.user.clone()).collect())
    }

    async fn user_tasks(&self, user_id: &str) -> ClientResult<Vec<Task>> {
        let state = self.lock();
        state.require_admin()?;
        state.account_index(user_id)?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        let mut state = self.lock();
        state.require_admin()?;
        let index = state.account_index(user_id)?;
        state.accounts.remove(index);
        state.tasks.retain(|t| t.user_id != user_id);
        if state.session.as_deref() == Some(user_id) {
            state.session = None;
        }
        Ok(())
    }

    async fn update_user_role(&self, user_id: &str, role: Role) -> ClientResult<()> {
        let mut state = self.lock();
        state.require_admin()?;
        let index = state.account_index(user_id)?;
        state.accounts[index].user.role = role;
        Ok(())
    }
}

static_assertions::assert_impl_all!(MemoryBackend: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_requires_session() {
        let backend = MemoryBackend::new();
        let result = backend.list(&FilterContext::new()).await;
        assert!(matches!(result, Err(ClientError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let backend = MemoryBackend::signed_in();
        let created = backend
            .create(&TaskDraft::new("Write docs").with_priority(Priority::High))
            .await
            .unwrap();
        assert_eq!(created.status, Status::Pending);
        assert!(created.created_at.is_some());

        let page = backend.list(&FilterContext::new()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, created.id);
        assert_eq!(page.items[0].position, Some(0));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let backend = MemoryBackend::signed_in();
        let result = backend.create(&TaskDraft::new("  ")).await;
        assert!(matches!(result, Err(ClientError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let backend = MemoryBackend::signed_in();
        let tasks = (1..=7)
            .map(|i| {
                let status = if i % 2 == 0 { Status::Completed } else { Status::Pending };
                Task::new(format!("t{}", i), format!("Task {}", i)).with_status(status)
            })
            .collect();
        backend.seed_tasks(tasks);

        let page = backend
            .list(&FilterContext::new().with_limit(3).with_page(3))
            .await
            .unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);
        assert_eq!(titles(&page.items), vec!["Task 7"]);

        let completed = backend
            .list(&FilterContext::new().with_status(Status::Completed))
            .await
            .unwrap();
        assert_eq!(completed.total, 3);

        let search = backend
            .list(&FilterContext::new().with_search("TASK 5"))
            .await
            .unwrap();
        assert_eq!(titles(&search.items), vec!["Task 5"]);
    }

    #[tokio::test]
    async fn test_tasks_are_scoped_to_owner() {
        let backend = MemoryBackend::signed_in();
        backend.seed_tasks(vec![Task::new("mine", "Mine")]);
        backend.add_account("other@example.com", "secret1", Role::User);
        backend
            .login(&Credentials::new("other@example.com", "secret1"))
            .await
            .unwrap();

        let page = backend.list(&FilterContext::new()).await.unwrap();
        assert!(page.items.is_empty());
        let result = backend.delete("mine").await;
        assert!(matches!(result, Err(ClientError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_position_moves_within_owner_tasks() {
        let backend = MemoryBackend::signed_in();
        backend.seed_tasks(vec![
            Task::new("a", "A"),
            Task::new("b", "B"),
            Task::new("c", "C"),
        ]);
        backend.update_position("c", 0).await.unwrap();

        let page = backend.list(&FilterContext::new()).await.unwrap();
        assert_eq!(titles(&page.items), vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_update_position_is_relative_to_listed_page() {
        let backend = MemoryBackend::signed_in();
        backend.seed_tasks(vec![
            Task::new("a", "A"),
            Task::new("b", "B"),
            Task::new("c", "C"),
            Task::new("d", "D"),
        ]);
        let second = FilterContext::new().with_limit(2).with_page(2);
        let page = backend.list(&second).await.unwrap();
        assert_eq!(titles(&page.items), vec!["C", "D"]);

        backend.update_position("d", 0).await.unwrap();

        let page = backend.list(&second).await.unwrap();
        assert_eq!(titles(&page.items), vec!["D", "C"]);
        assert_eq!(titles(&backend.all_tasks()), vec!["A", "B", "D", "C"]);
    }

    #[tokio::test]
    async fn test_update_position_is_relative_to_filtered_list() {
        let backend = MemoryBackend::signed_in();
        backend.seed_tasks(vec![
            Task::new("a", "A"),
            Task::new("b", "B").with_status(Status::Completed),
            Task::new("c", "C"),
            Task::new("d", "D").with_status(Status::Completed),
            Task::new("e", "E"),
        ]);
        let pending = FilterContext::new().with_status(Status::Pending);
        let page = backend.list(&pending).await.unwrap();
        assert_eq!(titles(&page.items), vec!["A", "C", "E"]);

        backend.update_position("e", 1).await.unwrap();

        let page = backend.list(&pending).await.unwrap();
        assert_eq!(titles(&page.items), vec!["A", "E", "C"]);
        // Tasks outside the filter keep their slots
        assert_eq!(
            titles(&backend.all_tasks()),
            vec!["A", "B", "E", "D", "C"]
        );
    }

    #[tokio::test]
    async fn test_update_position_clamps_to_page_end() {
        let backend = MemoryBackend::signed_in();
        backend.seed_tasks(vec![
            Task::new("a", "A"),
            Task::new("b", "B"),
            Task::new("c", "C"),
            Task::new("d", "D"),
        ]);
        let first = FilterContext::new().with_limit(2);
        backend.list(&first).await.unwrap();

        backend.update_position("a", 9).await.unwrap();

        let page = backend.list(&first).await.unwrap();
        assert_eq!(titles(&page.items), vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_update_position_failure_switch() {
        let backend = MemoryBackend::signed_in();
        backend.seed_tasks(vec![Task::new("a", "A"), Task::new("b", "B")]);
        backend.fail_position_updates(true);

        let result = backend.update_position("a", 1).await;
        assert!(matches!(result, Err(ClientError::Status { code: 500, .. })));
        assert_eq!(backend.position_calls(), vec![("a".to_string(), 1)]);

        let page = backend.list(&FilterContext::new()).await.unwrap();
        assert_eq!(titles(&page.items), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_login_register_logout() {
        let backend = MemoryBackend::new();
        let user = backend
            .register(&Credentials::new("new@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(backend.verify().await.unwrap(), user);

        backend.logout().await.unwrap();
        assert!(matches!(backend.verify().await, Err(ClientError::Unauthorized)));

        let dup = backend
            .register(&Credentials::new("NEW@example.com", "secret1"))
            .await;
        assert!(matches!(dup, Err(ClientError::Status { code: 409, .. })));

        let bad = backend
            .login(&Credentials::new("new@example.com", "wrong-password"))
            .await;
        assert!(matches!(bad, Err(ClientError::Status { code: 401, .. })));

        let again = backend
            .login(&Credentials::new("new@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
    }

    #[tokio::test]
    async fn test_admin_endpoints_require_admin() {
        let backend = MemoryBackend::with_demo_data();
        backend
            .login(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
            .await
            .unwrap();
        let result = backend.list_users().await;
        assert!(matches!(result, Err(ClientError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_admin_manages_users_and_tasks() {
        let backend = MemoryBackend::with_demo_data();
        backend
            .login(&Credentials::new(DEMO_ADMIN_EMAIL, DEMO_PASSWORD))
            .await
            .unwrap();

        let users = backend.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        let demo = users.iter().find(|u| u.email == DEMO_EMAIL).unwrap().clone();

        let tasks = backend.user_tasks(&demo.id).await.unwrap();
        assert_eq!(tasks.len(), 12);

        backend.delete(&tasks[0].id).await.unwrap();
        assert_eq!(backend.user_tasks(&demo.id).await.unwrap().len(), 11);

        backend.update_user_role(&demo.id, Role::Admin).await.unwrap();
        let users = backend.list_users().await.unwrap();
        assert!(users.iter().all(User::is_admin));

        backend.delete_user(&demo.id).await.unwrap();
        assert!(matches!(
            backend.user_tasks(&demo.id).await,
            Err(ClientError::NotFound { resource: "User", .. })
        ));
        assert!(backend.all_tasks().iter().all(|t| t.user_id != demo.id));
    }
}
