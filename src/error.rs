//! StudyMate Error Types
//!
//! Centralized error handling for the command pipeline and its collaborators.

use thiserror::Error;

/// Central error type for StudyMate
#[derive(Error, Debug)]
pub enum AssistError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for StudyMate operations
pub type AssistResult<T> = Result<T, AssistError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for AssistError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        AssistError::Lock(err.to_string())
    }
}
