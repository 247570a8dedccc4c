//! Login and register commands
//!
//! Both authenticate against the backend and save the session cookie so
//! later `tb` invocations run as the same user.

use clap::Args;
use taskboard_client::{AuthSession, Credentials, User};

use crate::context::{Backend, Context};
use crate::error::CliResult;

/// Email and password shared by `login` and `register`
#[derive(Debug, Args)]
pub struct CredentialArgs {
    /// Account email
    pub email: String,

    /// Account password (can also be set via TASKBOARD_PASSWORD env var)
    #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl CredentialArgs {
    fn credentials(&self) -> Credentials {
        Credentials::new(self.email.trim(), self.password.as_str())
    }
}

/// Log in and save the session
#[derive(Debug, Args)]
pub struct LoginCommand {
    #[command(flatten)]
    pub credentials: CredentialArgs,
}

impl LoginCommand {
    /// Execute the login command.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the credentials are malformed, rejected by the
    /// backend, or the session cannot be saved.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        let mut session = AuthSession::new();
        let user = session
            .login(&ctx.backend, &self.credentials.credentials())
            .await?;
        ctx.save_session(&user)?;
        Ok(format!("Logged in as {}", describe(&user)))
    }
}

/// Create an account and save the session
#[derive(Debug, Args)]
pub struct RegisterCommand {
    #[command(flatten)]
    pub credentials: CredentialArgs,
}

impl RegisterCommand {
    /// Execute the register command.
    pub async fn execute<B: Backend>(&self, ctx: &Context<B>) -> CliResult<String> {
        let mut session = AuthSession::new();
        let user = session
            .register(&ctx.backend, &self.credentials.credentials())
            .await?;
        ctx.save_session(&user)?;
        Ok(format!("Registered and logged in as {}", describe(&user)))
    }
}

pub(crate) fn describe(user: &User) -> String {
    format!("{} ({})", user.email, user.role)
}
