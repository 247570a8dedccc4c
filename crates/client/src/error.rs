use std::path::PathBuf;
use thiserror::Error;

/// Client error types for Taskboard
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure talking to the backend
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<reqwest::Error>,
    },

    /// The backend did not answer within the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The session is missing or has expired
    #[error("Not authenticated. Run 'tb login' first")]
    Unauthorized,

    /// The session is valid but lacks the required role
    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    /// A requested resource was not found
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    /// Any other non-success response from the backend
    #[error("Backend returned {code}: {message}")]
    Status { code: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The configured API URL could not be parsed
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Error reading or writing the session/config files
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a configuration file
    #[error("Failed to parse config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    /// Error for invalid input or validation failure
    #[error("{message}")]
    ValidationError { message: String },
}

impl ClientError {
    /// Get the full error message including the nested transport error.
    ///
    /// This is useful for displaying detailed error information to users.
    pub fn full_message(&self) -> String {
        match self {
            ClientError::Http { url, source } => {
                let mut message = format!("Request to {} failed: {}", url, source);
                let mut cause = std::error::Error::source(source.as_ref());
                while let Some(err) = cause {
                    message.push_str(&format!(": {}", err));
                    cause = err.source();
                }
                message
            }
            other => other.to_string(),
        }
    }

    /// Build a validation error from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::ValidationError {
            message: message.into(),
        }
    }

    /// Whether this error means the session is no longer usable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error_display() {
        let err = ClientError::Timeout {
            url: "http://localhost:5000/api/tasks".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request to http://localhost:5000/api/tasks timed out"
        );
    }

    #[test]
    fn test_unauthorized_error_display() {
        assert_eq!(
            ClientError::Unauthorized.to_string(),
            "Not authenticated. Run 'tb login' first"
        );
    }

    #[test]
    fn test_not_found_error_display() {
        let err = ClientError::NotFound {
            resource: "Task",
            id: "abc123".to_string(),
        };
        assert_eq!(err.to_string(), "Task 'abc123' not found");
    }

    #[test]
    fn test_status_error_display() {
        let err = ClientError::Status {
            code: 500,
            message: "Internal Server Error".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 500: Internal Server Error");
    }

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = ClientError::Io {
            path: PathBuf::from("/root/.config/taskboard/session.json"),
            source: io_err,
        };
        assert_eq!(
            err.to_string(),
            "Failed to access /root/.config/taskboard/session.json: access denied"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = ClientError::validation("Title is required");
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn test_full_message_falls_back_to_display() {
        let err = ClientError::Forbidden {
            message: "admin role required".to_string(),
        };
        assert_eq!(err.full_message(), "Permission denied: admin role required");
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(ClientError::Unauthorized.is_auth_failure());
        assert!(
            !ClientError::Forbidden {
                message: "nope".to_string()
            }
            .is_auth_failure()
        );
    }

    #[test]
    fn test_client_error_debug() {
        let err = ClientError::InvalidUrl {
            url: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        let debug_str = format!("{:?}", err);
        assert!(
            debug_str.contains("InvalidUrl") && debug_str.contains("not a url"),
            "Debug output should contain InvalidUrl and its field values"
        );
    }
}
