//! Field validation for values written to the pages store.
//!
//! Limits mirror the column widths of the persisted schema so that an
//! oversized value is rejected before any statement runs.

use crate::error::CoreError;

/// Maximum length of page, category, navigation path and snippet names.
pub const MAX_NAME_LEN: usize = 128;
/// Maximum length of a content title.
pub const MAX_TITLE_LEN: usize = 255;
/// Maximum length of a username.
pub const MAX_USERNAME_LEN: usize = 64;
/// Maximum length of an edit comment or a message subject.
pub const MAX_COMMENT_LEN: usize = 128;

/// Validate an entity name (non-blank, at most [`MAX_NAME_LEN`] characters).
pub fn validate_name(kind: &str, name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{kind} name must not be empty")));
    }
    check_len(kind, "name", name, MAX_NAME_LEN)
}

/// Validate a content title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    check_len("Content", "title", title, MAX_TITLE_LEN)
}

/// Validate the author of a content row or message.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    check_len("Author", "username", username, MAX_USERNAME_LEN)
}

/// Validate an edit comment or a message subject.
pub fn validate_comment(field: &str, value: &str) -> Result<(), CoreError> {
    check_len("Field", field, value, MAX_COMMENT_LEN)
}

fn check_len(kind: &str, field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{kind} {field} must be at most {max} characters"
        )));
    }
    Ok(())
}
