//! Configuration file handling.
//!
//! Settings live in an INI file at `~/.travelsafe/config.ini`. A missing file
//! or missing key means the built-in default. Every setting is addressable as
//! `section.key` through [`ConfigKey`] for the `config` CLI command.
//!
//! ```ini
//! [alerts]
//! radius_m = 500
//! cooldown_secs = 60
//! speech_rate = 1.0
//! speech_lang = en-US
//!
//! [tracking]
//! high_accuracy = true
//! max_cache_age_ms = 5000
//! timeout_ms = 15000
//! poll_interval_ms = 1000
//!
//! [storage]
//! path = /home/user/.travelsafe/state.json
//!
//! [speech]
//! command = espeak-ng
//!
//! [services]
//! geocode_url = https://nominatim.openstreetmap.org/search
//! route_url = https://router.project-osrm.org/route/v1/driving
//! timeout_secs = 10
//! ```

mod file;
mod keys;

pub use file::{
    AlertSettings, ConfigFile, ServiceSettings, SpeechSettings, StorageSettings,
    TrackingSettings, DEFAULT_SPEECH_COMMAND,
};
pub use keys::ConfigKey;

use std::path::PathBuf;

use thiserror::Error;

/// Name of the per-user application directory.
const APP_DIR_NAME: &str = ".travelsafe";

/// Errors loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Per-user application directory (`~/.travelsafe`).
///
/// Falls back to the working directory when no home directory is known.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    app_dir().join("config.ini")
}

/// Default path of the persisted state file.
pub fn default_storage_path() -> PathBuf {
    app_dir().join("state.json")
}

/// Default directory for log files.
pub fn default_log_dir() -> PathBuf {
    app_dir().join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_app_dir() {
        let dir = app_dir();
        assert!(dir.ends_with(APP_DIR_NAME));
        assert_eq!(config_file_path().parent(), Some(dir.as_path()));
        assert_eq!(default_storage_path().parent(), Some(dir.as_path()));
        assert!(default_log_dir().starts_with(&dir));
    }
}
