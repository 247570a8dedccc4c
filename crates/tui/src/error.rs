//! Error types for the TUI.

use std::io;
use taskboard_client::ClientError;
use thiserror::Error;

/// Result type for TUI operations.
pub type TuiResult<T> = Result<T, TuiError>;

/// Error type for TUI operations.
#[derive(Debug, Error)]
pub enum TuiError {
    /// Failed to initialize or restore the terminal.
    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),

    /// Configuration or backend setup failed before the UI started.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The log file subscriber could not be installed.
    #[error("Failed to set up logging: {0}")]
    Logging(String),
}

impl TuiError {
    /// Get the full error message including nested transport errors.
    pub fn full_message(&self) -> String {
        match self {
            TuiError::Client(err) => err.full_message(),
            other => other.to_string(),
        }
    }
}
