/// Errors raised by domain rules, before any statement reaches the store.
///
/// Missing rows and constraint failures are store concerns and live in the
/// persistence crate's error type.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}
