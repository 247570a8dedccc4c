//! Input validation for forms and commands
//!
//! Checks run before any request is sent so that obviously invalid input
//! never reaches the backend.

use crate::error::{ClientError, ClientResult};
use crate::models::{Credentials, TaskDraft, TaskPatch};

/// Minimum password length accepted by the auth forms
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate a task title (required, not blank).
pub fn validate_title(title: &str) -> ClientResult<()> {
    if title.trim().is_empty() {
        return Err(ClientError::validation("Title is required"));
    }
    Ok(())
}

/// Validate an email address.
///
/// Accepts `local@domain.tld` with no whitespace; this is a shape check,
/// the backend owns real validation.
pub fn validate_email(email: &str) -> ClientResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ClientError::validation("Email is required"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ClientError::validation("Email must be a valid email"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ClientError::validation("Email must be a valid email"))
    }
}

/// Validate a password (at least `MIN_PASSWORD_LEN` characters).
pub fn validate_password(password: &str) -> ClientResult<()> {
    if password.is_empty() {
        return Err(ClientError::validation("Password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Validate login/registration credentials.
pub fn validate_credentials(credentials: &Credentials) -> ClientResult<()> {
    validate_email(&credentials.email)?;
    validate_password(&credentials.password)
}

/// Validate a draft before creating a task.
pub fn validate_draft(draft: &TaskDraft) -> ClientResult<()> {
    validate_title(&draft.title)
}

/// Validate a patch before updating a task.
pub fn validate_patch(patch: &TaskPatch) -> ClientResult<()> {
    if !patch.has_updates() {
        return Err(ClientError::validation(
            "No updates specified. Use --title, --description, --status or --priority",
        ));
    }
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    Ok(())
}
