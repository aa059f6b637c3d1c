//! Typed view of the INI configuration file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;

use super::{config_file_path, default_storage_path, ConfigError};
use crate::alert::{AlertConfig, DEFAULT_ALERT_RADIUS_M, DEFAULT_ANNOUNCE_COOLDOWN};
use crate::announce::{SpeechOptions, DEFAULT_SPEECH_LANG, DEFAULT_SPEECH_RATE};
use crate::position::{
    TrackingConfig, DEFAULT_FIX_TIMEOUT, DEFAULT_MAX_CACHE_AGE, DEFAULT_POLL_INTERVAL,
};
use crate::services::{
    ServicesConfig, DEFAULT_GEOCODE_URL, DEFAULT_ROUTE_URL, DEFAULT_SERVICE_TIMEOUT,
};

/// Text-to-speech program used when none is configured.
pub const DEFAULT_SPEECH_COMMAND: &str = "espeak-ng";

/// `[alerts]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub radius_m: f64,
    pub cooldown_secs: u64,
    pub speech_rate: f32,
    pub speech_lang: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_ALERT_RADIUS_M,
            cooldown_secs: DEFAULT_ANNOUNCE_COOLDOWN.as_secs(),
            speech_rate: DEFAULT_SPEECH_RATE,
            speech_lang: DEFAULT_SPEECH_LANG.to_string(),
        }
    }
}

/// `[tracking]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSettings {
    pub high_accuracy: bool,
    pub max_cache_age_ms: u64,
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_cache_age_ms: DEFAULT_MAX_CACHE_AGE.as_millis() as u64,
            timeout_ms: DEFAULT_FIX_TIMEOUT.as_millis() as u64,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageSettings {
    /// State file; `None` means [`default_storage_path`].
    pub path: Option<PathBuf>,
}

/// `[speech]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSettings {
    /// Text-to-speech program. Empty disables spoken output.
    pub command: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_SPEECH_COMMAND.to_string(),
        }
    }
}

/// `[services]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub geocode_url: String,
    pub route_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            route_url: DEFAULT_ROUTE_URL.to_string(),
            timeout_secs: DEFAULT_SERVICE_TIMEOUT.as_secs(),
        }
    }
}

/// Complete configuration file contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub alerts: AlertSettings,
    pub tracking: TrackingSettings,
    pub storage: StorageSettings,
    pub speech: SpeechSettings,
    pub services: ServiceSettings,
}

impl ConfigFile {
    /// Load from [`config_file_path`]. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config = Self::from_ini(&ini)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        self.to_ini().write_to_file(path).map_err(write_err)?;
        tracing::info!(path = %path.display(), "Saved config file");
        Ok(())
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |section: &str, key: &str| {
            ini.section(Some(section))
                .and_then(|s| s.get(key))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let alerts = AlertSettings {
            radius_m: parse_or(get("alerts", "radius_m"), "alerts.radius_m", defaults.alerts.radius_m)?,
            cooldown_secs: parse_or(
                get("alerts", "cooldown_secs"),
                "alerts.cooldown_secs",
                defaults.alerts.cooldown_secs,
            )?,
            speech_rate: parse_or(
                get("alerts", "speech_rate"),
                "alerts.speech_rate",
                defaults.alerts.speech_rate,
            )?,
            speech_lang: get("alerts", "speech_lang")
                .map(str::to_string)
                .unwrap_or(defaults.alerts.speech_lang),
        };

        let tracking = TrackingSettings {
            high_accuracy: match get("tracking", "high_accuracy") {
                Some(v) => parse_bool(v, "tracking.high_accuracy")?,
                None => defaults.tracking.high_accuracy,
            },
            max_cache_age_ms: parse_or(
                get("tracking", "max_cache_age_ms"),
                "tracking.max_cache_age_ms",
                defaults.tracking.max_cache_age_ms,
            )?,
            timeout_ms: parse_or(
                get("tracking", "timeout_ms"),
                "tracking.timeout_ms",
                defaults.tracking.timeout_ms,
            )?,
            poll_interval_ms: parse_or(
                get("tracking", "poll_interval_ms"),
                "tracking.poll_interval_ms",
                defaults.tracking.poll_interval_ms,
            )?,
        };

        let storage = StorageSettings {
            path: get("storage", "path").map(PathBuf::from),
        };

        // An explicitly empty command disables speech, so read it unfiltered
        let speech = SpeechSettings {
            command: ini
                .section(Some("speech"))
                .and_then(|s| s.get("command"))
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.speech.command),
        };

        let services = ServiceSettings {
            geocode_url: get("services", "geocode_url")
                .map(str::to_string)
                .unwrap_or(defaults.services.geocode_url),
            route_url: get("services", "route_url")
                .map(str::to_string)
                .unwrap_or(defaults.services.route_url),
            timeout_secs: parse_or(
                get("services", "timeout_secs"),
                "services.timeout_secs",
                defaults.services.timeout_secs,
            )?,
        };

        let config = Self {
            alerts,
            tracking,
            storage,
            speech,
            services,
        };
        config.validate()?;
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("alerts"))
            .set("radius_m", self.alerts.radius_m.to_string())
            .set("cooldown_secs", self.alerts.cooldown_secs.to_string())
            .set("speech_rate", self.alerts.speech_rate.to_string())
            .set("speech_lang", self.alerts.speech_lang.clone());

        ini.with_section(Some("tracking"))
            .set("high_accuracy", self.tracking.high_accuracy.to_string())
            .set("max_cache_age_ms", self.tracking.max_cache_age_ms.to_string())
            .set("timeout_ms", self.tracking.timeout_ms.to_string())
            .set("poll_interval_ms", self.tracking.poll_interval_ms.to_string());

        ini.with_section(Some("storage")).set(
            "path",
            self.storage
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        );

        ini.with_section(Some("speech"))
            .set("command", self.speech.command.clone());

        ini.with_section(Some("services"))
            .set("geocode_url", self.services.geocode_url.clone())
            .set("route_url", self.services.route_url.clone())
            .set("timeout_secs", self.services.timeout_secs.to_string());

        ini
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, value: String, reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
            reason: reason.to_string(),
        };

        if !(self.alerts.radius_m.is_finite() && self.alerts.radius_m > 0.0) {
            return Err(invalid(
                "alerts.radius_m",
                self.alerts.radius_m.to_string(),
                "must be a positive number of meters",
            ));
        }
        if !(self.alerts.speech_rate.is_finite() && self.alerts.speech_rate > 0.0) {
            return Err(invalid(
                "alerts.speech_rate",
                self.alerts.speech_rate.to_string(),
                "must be a positive multiplier",
            ));
        }
        if self.tracking.poll_interval_ms == 0 {
            return Err(invalid("tracking.poll_interval_ms", "0".to_string(), "must be at least 1"));
        }
        if self.tracking.timeout_ms == 0 {
            return Err(invalid("tracking.timeout_ms", "0".to_string(), "must be at least 1"));
        }
        Ok(())
    }

    /// Alert engine configuration.
    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig::default()
            .with_radius_m(self.alerts.radius_m)
            .with_cooldown(Duration::from_secs(self.alerts.cooldown_secs))
            .with_speech(SpeechOptions {
                rate: self.alerts.speech_rate,
                lang: self.alerts.speech_lang.clone(),
            })
    }

    /// Position source configuration.
    pub fn tracking_config(&self) -> TrackingConfig {
        TrackingConfig {
            high_accuracy: self.tracking.high_accuracy,
            max_cache_age: Duration::from_millis(self.tracking.max_cache_age_ms),
            timeout: Duration::from_millis(self.tracking.timeout_ms),
            poll_interval: Duration::from_millis(self.tracking.poll_interval_ms),
        }
    }

    /// Lookup service configuration.
    pub fn services_config(&self) -> ServicesConfig {
        ServicesConfig {
            geocode_url: self.services.geocode_url.clone(),
            route_url: self.services.route_url.clone(),
            timeout: Duration::from_secs(self.services.timeout_secs),
        }
    }

    /// State file location.
    pub fn storage_path(&self) -> PathBuf {
        self.storage.path.clone().unwrap_or_else(default_storage_path)
    }
}

pub(super) fn parse_or<T: FromStr>(value: Option<&str>, key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: v.to_string(),
            reason: e.to_string(),
        }),
    }
}

pub(super) fn parse_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.alerts.radius_m, 500.0);
        assert_eq!(config.alerts.cooldown_secs, 60);
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(
            &path,
            "[alerts]\nradius_m = 250\n\n[tracking]\nhigh_accuracy = no\npoll_interval_ms = 2500\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.alerts.radius_m, 250.0);
        assert_eq!(config.alerts.cooldown_secs, 60);
        assert!(!config.tracking.high_accuracy);

        let tracking = config.tracking_config();
        assert_eq!(tracking.poll_interval, Duration::from_millis(2500));
        assert_eq!(tracking.timeout, DEFAULT_FIX_TIMEOUT);
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sub").join("config.ini");

        let mut config = ConfigFile::default();
        config.alerts.cooldown_secs = 90;
        config.storage.path = Some(PathBuf::from("/tmp/state.json"));
        config.speech.command = String::new();
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.storage_path(), PathBuf::from("/tmp/state.json"));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[alerts]\ncooldown_secs = soon\n").unwrap();

        match ConfigFile::load_from(&path) {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "alerts.cooldown_secs"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[alerts]\nradius_m = -5\n").unwrap();
        assert!(ConfigFile::load_from(&path).is_err());
    }

    #[test]
    fn test_alert_config_conversion() {
        let mut config = ConfigFile::default();
        config.alerts.speech_rate = 1.5;
        config.alerts.speech_lang = "th-TH".to_string();

        let alert = config.alert_config();
        assert_eq!(alert.radius_m, 500.0);
        assert_eq!(alert.cooldown, Duration::from_secs(60));
        assert_eq!(alert.speech.rate, 1.5);
        assert_eq!(alert.speech.lang, "th-TH");
    }

    #[test]
    fn test_parse_bool_variants() {
        assert!(parse_bool("TRUE", "k").unwrap());
        assert!(parse_bool("on", "k").unwrap());
        assert!(!parse_bool("0", "k").unwrap());
        assert!(parse_bool("maybe", "k").is_err());
    }
}
