//! CLI error type.

use thiserror::Error;

use travelsafe::app::AppError;
use travelsafe::config::ConfigError;
use travelsafe::coord::CoordError;
use travelsafe::hazard::HazardError;
use travelsafe::logging::LoggingError;
use travelsafe::position::TrackFileError;
use travelsafe::services::ServiceError;
use travelsafe::storage::StorageError;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Hazard(#[from] HazardError),

    #[error(transparent)]
    Coordinate(#[from] CoordError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Failed to load track: {0}")]
    Track(#[from] TrackFileError),

    #[error("Access denied")]
    AccessDenied,

    #[error("Input error: {0}")]
    Prompt(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("{0}")]
    NotFound(String),
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Prompt(e.to_string())
    }
}
