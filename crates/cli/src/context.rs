//! Execution context shared by all commands

use taskboard_client::{
    AdminApi, AuthApi, AuthSession, HttpClient, MemoryBackend, SavedSession, SessionStore,
    TaskApi, User,
};

use crate::error::CliResult;

/// A backend the CLI can drive: every API surface plus access to the
/// session token so a login can be saved.
pub trait Backend: TaskApi + AuthApi + AdminApi {
    /// Token identifying the current session, if any
    fn session_token(&self) -> Option<String>;
}

impl Backend for HttpClient {
    fn session_token(&self) -> Option<String> {
        HttpClient::session_token(self)
    }
}

impl Backend for MemoryBackend {
    fn session_token(&self) -> Option<String> {
        Some("memory".to_string())
    }
}

/// Backend, saved-session storage, and listing defaults for one run
pub struct Context<B> {
    pub backend: B,
    pub sessions: SessionStore,
    pub page_size: u32,
}

impl<B: Backend> Context<B> {
    pub fn new(backend: B, sessions: SessionStore, page_size: u32) -> Self {
        Self {
            backend,
            sessions,
            page_size,
        }
    }

    /// Persist the backend's current session for `user`.
    ///
    /// Does nothing when the backend did not hand out a token.
    pub fn save_session(&self, user: &User) -> CliResult<()> {
        if let Some(token) = self.backend.session_token() {
            self.sessions.save(&SavedSession {
                token,
                user: user.clone(),
            })?;
        }
        Ok(())
    }

    /// Verify the session with the backend and return it.
    ///
    /// A rejected session also removes the saved session file.
    pub async fn verified_session(&self) -> CliResult<AuthSession> {
        let mut session = AuthSession::new();
        match session.verify(&self.backend).await {
            Ok(_) => Ok(session),
            Err(err) => {
                if err.is_auth_failure() {
                    self.sessions.clear()?;
                }
                Err(err.into())
            }
        }
    }
}
