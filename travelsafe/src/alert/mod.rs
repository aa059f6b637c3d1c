//! Proximity alert engine.
//!
//! Decides, from the latest position reading and the current hazard
//! snapshot, which hazard the user is approaching and whether to speak a
//! warning.
//!
//! # Evaluation
//!
//! ```text
//! reading ──► Known? ──no──► banner cleared
//!               │ yes
//!               ▼
//!         distance to every hazard
//!               │
//!               ▼
//!         in range (<= radius) ──► nearest ──► banner
//!               │
//!               ▼
//!         each in-range hazard ──► cooldown Silent? ──► announce
//! ```
//!
//! The banner and the voice channel are decoupled: cooldown only decides
//! whether an announcement is spoken, never whether the banner is shown.

mod cooldown;
mod engine;

pub use cooldown::{CooldownState, CooldownTracker};
pub use engine::{AlertEngine, Evaluation};

use std::fmt;
use std::time::Duration;

use crate::announce::SpeechOptions;
use crate::hazard::HazardId;

/// Alert radius around every hazard, in meters.
pub const DEFAULT_ALERT_RADIUS_M: f64 = 500.0;

/// Minimum time between two voice announcements for the same hazard.
pub const DEFAULT_ANNOUNCE_COOLDOWN: Duration = Duration::from_secs(60);

/// Configuration for the alert engine.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Distance at or under which a hazard counts as in range (meters).
    pub radius_m: f64,
    /// Per-hazard announcement cooldown.
    pub cooldown: Duration,
    /// Voice parameters passed to the announcement sink.
    pub speech: SpeechOptions,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_ALERT_RADIUS_M,
            cooldown: DEFAULT_ANNOUNCE_COOLDOWN,
            speech: SpeechOptions::default(),
        }
    }
}

impl AlertConfig {
    /// Set the alert radius.
    pub fn with_radius_m(mut self, radius_m: f64) -> Self {
        self.radius_m = radius_m;
        self
    }

    /// Set the announcement cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the speech options.
    pub fn with_speech(mut self, speech: SpeechOptions) -> Self {
        self.speech = speech;
        self
    }
}

/// Whether a hazard at `distance_m` is inside the alert radius.
///
/// The boundary is inclusive. NaN is never in range.
#[inline]
pub fn is_in_range(distance_m: f64, radius_m: f64) -> bool {
    distance_m <= radius_m
}

/// The nearest in-range hazard, shown as the warning banner.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAlert {
    pub hazard_id: HazardId,
    pub hazard_name: String,
    pub distance_m: f64,
}

impl fmt::Display for ActiveAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Warning: Approaching {} (Dist: {:.1}m)",
            self.hazard_name, self.distance_m
        )
    }
}

/// Text spoken when a hazard is announced.
pub fn announcement_text(hazard_name: &str) -> String {
    format!(
        "Warning. Approaching hazard: {}. Please be careful.",
        hazard_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_inclusive() {
        assert!(is_in_range(500.0, DEFAULT_ALERT_RADIUS_M));
        assert!(is_in_range(499.999, DEFAULT_ALERT_RADIUS_M));
        assert!(!is_in_range(500.000_001, DEFAULT_ALERT_RADIUS_M));
        assert!(!is_in_range(f64::NAN, DEFAULT_ALERT_RADIUS_M));
    }

    #[test]
    fn test_active_alert_banner_text() {
        let alert = ActiveAlert {
            hazard_id: HazardId::from_raw(1),
            hazard_name: "Construction Zone".to_string(),
            distance_m: 154.96,
        };
        assert_eq!(
            alert.to_string(),
            "Warning: Approaching Construction Zone (Dist: 155.0m)"
        );
    }

    #[test]
    fn test_announcement_text() {
        assert_eq!(
            announcement_text("Flood"),
            "Warning. Approaching hazard: Flood. Please be careful."
        );
    }

    #[test]
    fn test_default_config() {
        let config = AlertConfig::default();
        assert_eq!(config.radius_m, 500.0);
        assert_eq!(config.cooldown, Duration::from_secs(60));
    }
}
