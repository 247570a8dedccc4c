use std::path::PathBuf;
use taskboard_client::ClientError;
use thiserror::Error;

/// Error types for the `tb` command-line client
#[derive(Error, Debug)]
pub enum CliError {
    /// Any failure reported by the client library
    #[error(transparent)]
    Client(#[from] ClientError),

    /// No platform config directory to keep the session in
    #[error("Could not determine a config directory for the saved session")]
    NoConfigDir,

    /// The command needs a role the session does not have
    #[error("Admin access required (logged in as {email})")]
    AdminRequired { email: String },

    /// JSON output could not be produced
    #[error("Failed to render JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// A saved session file exists but could not be used
    #[error("Saved session at {path} is unusable; run 'tb login' again")]
    BadSession { path: PathBuf },
}

impl CliError {
    /// Get the full error message including nested transport errors.
    pub fn full_message(&self) -> String {
        match self {
            CliError::Client(err) => err.full_message(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for CLI commands
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_is_transparent() {
        let err = CliError::from(ClientError::Unauthorized);
        assert_eq!(err.to_string(), "Not authenticated. Run 'tb login' first");
        assert_eq!(err.full_message(), err.to_string());
    }

    #[test]
    fn test_admin_required_display() {
        let err = CliError::AdminRequired {
            email: "a@b.io".to_string(),
        };
        assert_eq!(err.to_string(), "Admin access required (logged in as a@b.io)");
    }
}
