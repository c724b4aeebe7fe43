//! Error types for gator.

use thiserror::Error;

/// Common error type for gator.
#[derive(Error, Debug)]
pub enum GatorError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input or feed content.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// No active user is selected.
    #[error("session error: {0}")]
    Session(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for GatorError {
    fn from(e: sqlx::Error) -> Self {
        GatorError::Database(e.to_string())
    }
}

/// Result type alias for gator operations.
pub type Result<T> = std::result::Result<T, GatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = GatorError::Validation("item has no link".to_string());
        assert_eq!(err.to_string(), "validation error: item has no link");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = GatorError::NotFound("user 'kahya'".to_string());
        assert_eq!(err.to_string(), "user 'kahya' not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GatorError = io_err.into();
        assert!(matches!(err, GatorError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: GatorError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, GatorError::Database(_)));
    }

    #[test]
    fn test_config_error_display() {
        let err = GatorError::Config("interval must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: interval must be positive"
        );
    }
}
