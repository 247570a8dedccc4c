//! Client library for Taskboard
//!
//! Provides the task backend API client (HTTP and in-memory), the page
//! cache keyed by filter context, the optimistic reorder controller, and
//! the auth session shared by the CLI and TUI front ends.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod memory;
pub mod models;
pub mod notice;
pub mod reorder;
pub mod session;
pub mod stats;
pub mod validation;

pub use api::{AdminApi, AuthApi, TaskApi};
pub use auth::{AuthSession, AuthState, Route, gate};
pub use cache::{CachedPage, TaskCache};
pub use config::{ClientConfig, ConfigOverrides};
pub use error::{ClientError, ClientResult};
pub use filter::{FilterContext, cycle_priority, cycle_status};
pub use http::{HttpClient, SESSION_COOKIE};
pub use memory::MemoryBackend;
pub use models::{Credentials, Page, Priority, Role, Status, Task, TaskDraft, TaskPatch, User};
pub use notice::{Notice, NoticeLevel};
pub use reorder::{CommitDecision, MoveOutcome, PendingMove, ReorderController, array_move};
pub use session::{SavedSession, SessionStore};
pub use stats::TaskStats;

/// Build an HTTP client for the configured backend.
///
/// When a saved session is given its cookie is seeded into the client so
/// requests are authenticated without logging in again.
///
/// # Errors
///
/// Returns `ClientError::InvalidUrl` if the configured API URL is invalid.
pub fn connect(config: &ClientConfig, session: Option<&SavedSession>) -> ClientResult<HttpClient> {
    let client = HttpClient::from_config(config)?;
    Ok(match session {
        Some(saved) => client.with_session_token(&saved.token),
        None => client,
    })
}
