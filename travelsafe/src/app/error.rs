//! Application error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::hazard::HazardError;
use crate::storage::StorageError;

/// Errors surfaced by the application shell.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading or saving persisted state failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A hazard form was rejected before reaching the store.
    #[error("Invalid hazard: {0}")]
    InvalidHazard(#[from] HazardError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The session event loop is no longer running.
    #[error("Session has stopped")]
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidHazard(HazardError::EmptyName);
        assert!(err.to_string().starts_with("Invalid hazard:"));

        assert_eq!(AppError::SessionClosed.to_string(), "Session has stopped");
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error;

        let err = AppError::from(HazardError::EmptyName);
        assert!(err.source().is_some());
    }
}
