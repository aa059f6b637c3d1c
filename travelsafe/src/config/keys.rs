//! `section.key` addressing of configuration settings.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::{parse_bool, parse_or};
use super::{ConfigError, ConfigFile};

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    AlertsRadiusM,
    AlertsCooldownSecs,
    AlertsSpeechRate,
    AlertsSpeechLang,
    TrackingHighAccuracy,
    TrackingMaxCacheAgeMs,
    TrackingTimeoutMs,
    TrackingPollIntervalMs,
    StoragePath,
    SpeechCommand,
    ServicesGeocodeUrl,
    ServicesRouteUrl,
    ServicesTimeoutSecs,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        use ConfigKey::*;
        &[
            AlertsRadiusM,
            AlertsCooldownSecs,
            AlertsSpeechRate,
            AlertsSpeechLang,
            TrackingHighAccuracy,
            TrackingMaxCacheAgeMs,
            TrackingTimeoutMs,
            TrackingPollIntervalMs,
            StoragePath,
            SpeechCommand,
            ServicesGeocodeUrl,
            ServicesRouteUrl,
            ServicesTimeoutSecs,
        ]
    }

    /// Full dotted name, e.g. `alerts.radius_m`.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::AlertsRadiusM => "alerts.radius_m",
            ConfigKey::AlertsCooldownSecs => "alerts.cooldown_secs",
            ConfigKey::AlertsSpeechRate => "alerts.speech_rate",
            ConfigKey::AlertsSpeechLang => "alerts.speech_lang",
            ConfigKey::TrackingHighAccuracy => "tracking.high_accuracy",
            ConfigKey::TrackingMaxCacheAgeMs => "tracking.max_cache_age_ms",
            ConfigKey::TrackingTimeoutMs => "tracking.timeout_ms",
            ConfigKey::TrackingPollIntervalMs => "tracking.poll_interval_ms",
            ConfigKey::StoragePath => "storage.path",
            ConfigKey::SpeechCommand => "speech.command",
            ConfigKey::ServicesGeocodeUrl => "services.geocode_url",
            ConfigKey::ServicesRouteUrl => "services.route_url",
            ConfigKey::ServicesTimeoutSecs => "services.timeout_secs",
        }
    }

    pub fn section(&self) -> &'static str {
        self.split().0
    }

    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or((name, ""))
    }

    /// Current value as text. Empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::AlertsRadiusM => config.alerts.radius_m.to_string(),
            ConfigKey::AlertsCooldownSecs => config.alerts.cooldown_secs.to_string(),
            ConfigKey::AlertsSpeechRate => config.alerts.speech_rate.to_string(),
            ConfigKey::AlertsSpeechLang => config.alerts.speech_lang.clone(),
            ConfigKey::TrackingHighAccuracy => config.tracking.high_accuracy.to_string(),
            ConfigKey::TrackingMaxCacheAgeMs => config.tracking.max_cache_age_ms.to_string(),
            ConfigKey::TrackingTimeoutMs => config.tracking.timeout_ms.to_string(),
            ConfigKey::TrackingPollIntervalMs => config.tracking.poll_interval_ms.to_string(),
            ConfigKey::StoragePath => config
                .storage
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::SpeechCommand => config.speech.command.clone(),
            ConfigKey::ServicesGeocodeUrl => config.services.geocode_url.clone(),
            ConfigKey::ServicesRouteUrl => config.services.route_url.clone(),
            ConfigKey::ServicesTimeoutSecs => config.services.timeout_secs.to_string(),
        }
    }

    /// Parse `value` and store it. The config is unchanged on error.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let key = self.name();
        let mut updated = config.clone();

        match self {
            ConfigKey::AlertsRadiusM => {
                updated.alerts.radius_m = parse_or(Some(value), key, 0.0)?;
            }
            ConfigKey::AlertsCooldownSecs => {
                updated.alerts.cooldown_secs = parse_or(Some(value), key, 0)?;
            }
            ConfigKey::AlertsSpeechRate => {
                updated.alerts.speech_rate = parse_or(Some(value), key, 0.0)?;
            }
            ConfigKey::AlertsSpeechLang => updated.alerts.speech_lang = value.to_string(),
            ConfigKey::TrackingHighAccuracy => {
                updated.tracking.high_accuracy = parse_bool(value, key)?;
            }
            ConfigKey::TrackingMaxCacheAgeMs => {
                updated.tracking.max_cache_age_ms = parse_or(Some(value), key, 0)?;
            }
            ConfigKey::TrackingTimeoutMs => {
                updated.tracking.timeout_ms = parse_or(Some(value), key, 0)?;
            }
            ConfigKey::TrackingPollIntervalMs => {
                updated.tracking.poll_interval_ms = parse_or(Some(value), key, 0)?;
            }
            ConfigKey::StoragePath => {
                updated.storage.path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            ConfigKey::SpeechCommand => updated.speech.command = value.to_string(),
            ConfigKey::ServicesGeocodeUrl => updated.services.geocode_url = value.to_string(),
            ConfigKey::ServicesRouteUrl => updated.services.route_url = value.to_string(),
            ConfigKey::ServicesTimeoutSecs => {
                updated.services.timeout_secs = parse_or(Some(value), key, 0)?;
            }
        }

        updated.validate()?;
        *config = updated;
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_parses_from_its_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
            assert_eq!(format!("{}.{}", key.section(), key.key_name()), key.name());
        }
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            "alerts.volume".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();
        ConfigKey::AlertsCooldownSecs.set(&mut config, "120").unwrap();
        ConfigKey::TrackingHighAccuracy.set(&mut config, "off").unwrap();
        ConfigKey::StoragePath.set(&mut config, "/data/state.json").unwrap();

        assert_eq!(ConfigKey::AlertsCooldownSecs.get(&config), "120");
        assert_eq!(ConfigKey::TrackingHighAccuracy.get(&config), "false");
        assert_eq!(ConfigKey::StoragePath.get(&config), "/data/state.json");

        ConfigKey::StoragePath.set(&mut config, "").unwrap();
        assert_eq!(ConfigKey::StoragePath.get(&config), "");
    }

    #[test]
    fn test_invalid_set_leaves_config_unchanged() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::AlertsRadiusM.set(&mut config, "far").is_err());
        assert!(ConfigKey::AlertsRadiusM.set(&mut config, "0").is_err());
        assert!(ConfigKey::TrackingPollIntervalMs.set(&mut config, "0").is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_sections_are_contiguous() {
        let mut seen: Vec<&str> = Vec::new();
        for key in ConfigKey::all() {
            if seen.last() != Some(&key.section()) {
                assert!(!seen.contains(&key.section()), "section {} split", key.section());
                seen.push(key.section());
            }
        }
        assert_eq!(seen, ["alerts", "tracking", "storage", "speech", "services"]);
    }
}
