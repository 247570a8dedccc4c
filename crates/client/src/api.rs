//! API traits for the task backend
//!
//! Split by concern so that each consumer only depends on what it calls:
//! the reorder controller needs `TaskApi` alone, the auth session needs
//! `AuthApi`, and the admin panel needs `AdminApi`. `HttpClient` and
//! `MemoryBackend` implement all three.

use std::future::Future;

use crate::error::ClientResult;
use crate::filter::FilterContext;
use crate::models::{Credentials, Page, Role, Task, TaskDraft, TaskPatch, User};

/// Task listing and mutation
pub trait TaskApi: Send + Sync {
    /// Fetch one page of tasks for the filter context.
    fn list(
        &self,
        filter: &FilterContext,
    ) -> impl Future<Output = ClientResult<Page<Task>>> + Send;

    /// Create a task owned by the current user.
    fn create(&self, draft: &TaskDraft) -> impl Future<Output = ClientResult<Task>> + Send;

    /// Apply a partial update to a task.
    fn update(
        &self,
        id: &str,
        patch: &TaskPatch,
    ) -> impl Future<Output = ClientResult<Task>> + Send;

    /// Delete a task.
    fn delete(&self, id: &str) -> impl Future<Output = ClientResult<()>> + Send;

    /// Persist a task's zero-based rank within its current page.
    fn update_position(
        &self,
        id: &str,
        position: u32,
    ) -> impl Future<Output = ClientResult<()>> + Send;
}

/// Session lifecycle
pub trait AuthApi: Send + Sync {
    /// Log in and establish a session.
    fn login(&self, credentials: &Credentials)
    -> impl Future<Output = ClientResult<User>> + Send;

    /// Create an account and establish a session.
    fn register(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = ClientResult<User>> + Send;

    /// End the current session.
    fn logout(&self) -> impl Future<Output = ClientResult<()>> + Send;

    /// Return the user owning the current session.
    fn verify(&self) -> impl Future<Output = ClientResult<User>> + Send;
}

/// Admin panel operations
pub trait AdminApi: Send + Sync {
    /// List every account.
    fn list_users(&self) -> impl Future<Output = ClientResult<Vec<User>>> + Send;

    /// List every task owned by a user.
    fn user_tasks(&self, user_id: &str) -> impl Future<Output = ClientResult<Vec<Task>>> + Send;

    /// Delete an account.
    fn delete_user(&self, user_id: &str) -> impl Future<Output = ClientResult<()>> + Send;

    /// Change an account's role.
    fn update_user_role(
        &self,
        user_id: &str,
        role: Role,
    ) -> impl Future<Output = ClientResult<()>> + Send;
}
