//! Auth session and route gating
//!
//! `AuthSession` is passed explicitly to whatever needs the current user.
//! Its lifecycle is `Unauthenticated -> Verifying -> Authenticated | Failed`,
//! and logging out always returns it to `Unauthenticated`.

use crate::api::AuthApi;
use crate::error::{ClientError, ClientResult};
use crate::models::{Credentials, User};
use crate::validation::validate_credentials;

/// Where the session currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Verifying,
    Authenticated(User),
    /// The last attempt failed for a reason other than a missing session
    Failed(String),
}

/// The logged-in user, if any
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    state: AuthState,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that is already authenticated as `user`
    pub fn authenticated(user: User) -> Self {
        Self {
            state: AuthState::Authenticated(user),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }

    /// Enter `Verifying` before a verify request is sent.
    pub fn begin_verify(&mut self) {
        self.state = AuthState::Verifying;
    }

    /// Record the result of a verify, login, or register request.
    ///
    /// A rejected session (`Unauthorized`) leaves the session
    /// `Unauthenticated`; any other error is kept as `Failed`.
    pub fn complete(&mut self, result: ClientResult<User>) -> ClientResult<User> {
        match result {
            Ok(user) => {
                self.state = AuthState::Authenticated(user.clone());
                Ok(user)
            }
            Err(ClientError::Unauthorized) => {
                self.state = AuthState::Unauthenticated;
                Err(ClientError::Unauthorized)
            }
            Err(err) => {
                self.state = AuthState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Drop the local session without contacting the backend.
    pub fn clear(&mut self) {
        self.state = AuthState::Unauthenticated;
    }

    /// Check the current session with the backend.
    pub async fn verify<A: AuthApi>(&mut self, api: &A) -> ClientResult<User> {
        self.begin_verify();
        let result = api.verify().await;
        self.complete(result)
    }

    /// Log in after validating the credentials locally.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ValidationError` without sending a request if
    /// the email or password is malformed.
    pub async fn login<A: AuthApi>(
        &mut self,
        api: &A,
        credentials: &Credentials,
    ) -> ClientResult<User> {
        validate_credentials(credentials)?;
        let result = api.login(credentials).await;
        self.complete(result)
    }

    /// Register after validating the credentials locally.
    pub async fn register<A: AuthApi>(
        &mut self,
        api: &A,
        credentials: &Credentials,
    ) -> ClientResult<User> {
        validate_credentials(credentials)?;
        let result = api.register(credentials).await;
        self.complete(result)
    }

    /// Log out. The session ends even if the backend call fails.
    pub async fn logout<A: AuthApi>(&mut self, api: &A) -> ClientResult<()> {
        let result = api.logout().await;
        self.clear();
        result
    }
}

/// Screens guarded by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Admin,
    /// Admin view of one user's tasks
    AdminUserTasks(String),
}

impl Route {
    /// Login and register are only for signed-out users
    pub fn is_auth_route(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    pub fn is_admin_route(&self) -> bool {
        matches!(self, Route::Admin | Route::AdminUserTasks(_))
    }

    /// Path of the route in the web client, used in logs
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::AdminUserTasks(id) => format!("/admin/users/{}/tasks", id),
        }
    }
}

/// Resolve the route a user actually lands on.
///
/// - Auth routes redirect signed-in users to the dashboard.
/// - Every other route redirects signed-out users to login.
/// - Admin routes redirect non-admins to the dashboard.
pub fn gate(route: Route, session: &AuthSession) -> Route {
    match session.user() {
        None if route.is_auth_route() => route,
        None => Route::Login,
        Some(_) if route.is_auth_route() => Route::Dashboard,
        Some(user) if route.is_admin_route() && !user.is_admin() => Route::Dashboard,
        Some(_) => route,
    }
}
