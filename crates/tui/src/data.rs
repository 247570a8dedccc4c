//! Background requests for the TUI.
//!
//! Every backend call runs on its own tokio task and reports back to the
//! event loop over an unbounded channel, so drawing and key handling never
//! wait on the network.

use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, trace};

use taskboard_client::{
    AdminApi, AuthApi, ClientResult, Credentials, FilterContext, Page, PendingMove, Role, Task,
    TaskApi, TaskDraft, TaskPatch, User,
};

/// Everything the TUI needs from a backend.
pub trait Backend: TaskApi + AuthApi + AdminApi + 'static {}

impl<T: TaskApi + AuthApi + AdminApi + 'static> Backend for T {}

/// Which auth request produced a `User`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequest {
    Verify,
    Login,
    Register,
}

/// A completed background request
#[derive(Debug)]
pub enum ApiEvent {
    Auth {
        request: AuthRequest,
        result: ClientResult<User>,
    },
    LoggedOut(ClientResult<()>),
    TasksLoaded {
        filter: FilterContext,
        result: ClientResult<Page<Task>>,
    },
    PositionUpdated {
        pending: PendingMove,
        result: ClientResult<()>,
    },
    TaskSaved {
        created: bool,
        result: ClientResult<Task>,
    },
    TaskDeleted {
        id: String,
        result: ClientResult<()>,
    },
    UsersLoaded(ClientResult<Vec<User>>),
    UserTasksLoaded {
        user_id: String,
        result: ClientResult<Vec<Task>>,
    },
    /// An admin mutation finished; `done` and `failed` are the messages
    /// to show for each outcome
    AdminUpdated {
        done: &'static str,
        failed: &'static str,
        result: ClientResult<()>,
    },
}

/// Spawns backend calls and delivers their results as `ApiEvent`s.
pub struct Requests<B> {
    backend: Arc<B>,
    tx: UnboundedSender<ApiEvent>,
}

impl<B> Clone for Requests<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            tx: self.tx.clone(),
        }
    }
}

impl<B: Backend> Requests<B> {
    /// Create a dispatcher and the receiver its results arrive on.
    pub fn new(backend: Arc<B>) -> (Self, UnboundedReceiver<ApiEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { backend, tx }, rx)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn spawn<F, Fut>(&self, label: &'static str, call: F)
    where
        F: FnOnce(Arc<B>) -> Fut + Send + 'static,
        Fut: Future<Output = ApiEvent> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        trace!(request = label, "spawning request");
        tokio::spawn(async move {
            let event = call(backend).await;
            if tx.send(event).is_err() {
                debug!(request = label, "event loop gone; dropping result");
            }
        });
    }

    pub fn verify(&self) {
        self.spawn("verify", move |api| async move {
            ApiEvent::Auth {
                request: AuthRequest::Verify,
                result: api.verify().await,
            }
        });
    }

    pub fn login(&self, credentials: Credentials) {
        self.spawn("login", move |api| async move {
            ApiEvent::Auth {
                request: AuthRequest::Login,
                result: api.login(&credentials).await,
            }
        });
    }

    pub fn register(&self, credentials: Credentials) {
        self.spawn("register", move |api| async move {
            ApiEvent::Auth {
                request: AuthRequest::Register,
                result: api.register(&credentials).await,
            }
        });
    }

    pub fn logout(&self) {
        self.spawn("logout", move |api| async move {
            ApiEvent::LoggedOut(api.logout().await)
        });
    }

    /// Fetch one page of tasks for `filter`.
    pub fn fetch_tasks(&self, filter: FilterContext) {
        self.spawn("list", move |api| async move {
            let result = api.list(&filter).await;
            ApiEvent::TasksLoaded { filter, result }
        });
    }

    /// Persist a move decided by the reorder controller.
    pub fn update_position(&self, pending: PendingMove) {
        self.spawn("update_position", move |api| async move {
            let result = api.update_position(&pending.task_id, pending.position).await;
            ApiEvent::PositionUpdated { pending, result }
        });
    }

    pub fn create_task(&self, draft: TaskDraft) {
        self.spawn("create", move |api| async move {
            ApiEvent::TaskSaved {
                created: true,
                result: api.create(&draft).await,
            }
        });
    }

    pub fn update_task(&self, id: String, patch: TaskPatch) {
        self.spawn("update", move |api| async move {
            ApiEvent::TaskSaved {
                created: false,
                result: api.update(&id, &patch).await,
            }
        });
    }

    pub fn delete_task(&self, id: String) {
        self.spawn("delete", move |api| async move {
            let result = api.delete(&id).await;
            ApiEvent::TaskDeleted { id, result }
        });
    }

    pub fn fetch_users(&self) {
        self.spawn("list_users", move |api| async move {
            ApiEvent::UsersLoaded(api.list_users().await)
        });
    }

    pub fn fetch_user_tasks(&self, user_id: String) {
        self.spawn("user_tasks", move |api| async move {
            let result = api.user_tasks(&user_id).await;
            ApiEvent::UserTasksLoaded { user_id, result }
        });
    }

    pub fn set_role(&self, user_id: String, role: Role) {
        self.spawn("update_user_role", move |api| async move {
            ApiEvent::AdminUpdated {
                done: "User role updated successfully",
                failed: "Failed to update user role",
                result: api.update_user_role(&user_id, role).await,
            }
        });
    }

    pub fn delete_user(&self, user_id: String) {
        self.spawn("delete_user", move |api| async move {
            ApiEvent::AdminUpdated {
                done: "User deleted successfully",
                failed: "Failed to delete user",
                result: api.delete_user(&user_id).await,
            }
        });
    }

    /// Delete another user's task from the admin panel.
    pub fn admin_delete_task(&self, task_id: String) {
        self.spawn("admin_delete_task", move |api| async move {
            ApiEvent::AdminUpdated {
                done: "Task deleted successfully!",
                failed: "Failed to delete task.",
                result: api.delete(&task_id).await,
            }
        });
    }
}
