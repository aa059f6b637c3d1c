//! Session configuration.
//!
//! `AppConfig` combines the component configurations a session needs. It is
//! built from the configuration file and adjusted by CLI flags.

use crate::alert::AlertConfig;
use crate::config::ConfigFile;
use crate::position::TrackingConfig;

/// Configuration for one navigation session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Proximity alert settings.
    pub alerts: AlertConfig,

    /// Position polling settings.
    pub tracking: TrackingConfig,

    /// Whether tracking starts enabled.
    pub start_tracking: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            alerts: AlertConfig::default(),
            tracking: TrackingConfig::default(),
            start_tracking: true,
        }
    }
}

impl AppConfig {
    /// Extract session settings from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            alerts: config.alert_config(),
            tracking: config.tracking_config(),
            start_tracking: true,
        }
    }

    pub fn with_alerts(mut self, alerts: AlertConfig) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_tracking(mut self, tracking: TrackingConfig) -> Self {
        self.tracking = tracking;
        self
    }

    /// Start the session with tracking on or off.
    pub fn with_start_tracking(mut self, enabled: bool) -> Self {
        self.start_tracking = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.alerts.cooldown_secs = 30;
        file.tracking.poll_interval_ms = 250;

        let config = AppConfig::from_config_file(&file);
        assert_eq!(config.alerts.cooldown, Duration::from_secs(30));
        assert_eq!(config.tracking.poll_interval, Duration::from_millis(250));
        assert!(config.start_tracking);
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::default()
            .with_start_tracking(false)
            .with_alerts(AlertConfig::default().with_radius_m(100.0));
        assert!(!config.start_tracking);
        assert_eq!(config.alerts.radius_m, 100.0);
    }
}
