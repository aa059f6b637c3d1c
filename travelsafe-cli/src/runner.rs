//! Shared command setup: configuration and logging.

use travelsafe::config::{default_log_dir, ConfigFile};
use travelsafe::logging::{init_logging, LoggingConfig, WorkerGuard};

use crate::error::CliError;

/// Loaded configuration plus the logging guard for one CLI invocation.
pub struct CliRunner {
    config: ConfigFile,
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    /// Initialise logging and load the configuration file.
    ///
    /// File logging is only enabled for long-running commands.
    pub fn new(verbose: bool, log_to_file: bool) -> Result<Self, CliError> {
        let mut logging = LoggingConfig::default().with_verbose(verbose);
        if log_to_file {
            logging = logging.with_log_dir(default_log_dir());
        }
        let log_guard = init_logging(&logging)?;

        let config = ConfigFile::load()?;

        Ok(Self {
            config,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command and version at startup.
    pub fn log_startup(&self, command: &str) {
        tracing::info!(
            command,
            version = travelsafe::VERSION,
            storage = %self.config.storage_path().display(),
            "TravelSafe starting"
        );
    }
}
