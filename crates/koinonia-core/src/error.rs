//! Centralized error types.

use thiserror::Error;

/// Main error type for Koinonia operations.
#[derive(Error, Debug)]
pub enum KoinoniaError {
    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Convert not found: {0}")]
    ConvertNotFound(String),

    #[error("Cell not found: {0}")]
    CellNotFound(String),

    #[error("Supervision not found: {0}")]
    SupervisionNotFound(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    #[error("Invalid status transition: cannot move from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(#[from] koinonia_db::DbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Koinonia operations.
pub type KoinoniaResult<T> = Result<T, KoinoniaError>;

impl KoinoniaError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// True when the error means "no such record".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PersonNotFound(_)
                | Self::ConvertNotFound(_)
                | Self::CellNotFound(_)
                | Self::SupervisionNotFound(_)
                | Self::AlertNotFound(_)
                | Self::Database(koinonia_db::DbError::NotFound(_))
        )
    }
}
