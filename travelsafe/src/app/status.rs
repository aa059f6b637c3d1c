//! Published session state.

use chrono::{DateTime, Local};

use crate::alert::ActiveAlert;
use crate::coord::Coordinate;
use crate::position::ReadingFailure;

/// What a view shows about the running session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStatus {
    /// Whether the position source is enabled.
    pub tracking: bool,
    /// Last known position. Kept across failed readings for display.
    pub position: Option<Coordinate>,
    /// Wall-clock time of the last successful fix.
    pub last_fix_at: Option<DateTime<Local>>,
    /// Failure reported by the latest reading, cleared by the next fix.
    pub position_error: Option<ReadingFailure>,
    /// Warning banner.
    pub active_alert: Option<ActiveAlert>,
    pub hazard_count: usize,
    /// Last persistence failure, if saving has failed.
    pub storage_error: Option<String>,
}

impl SessionStatus {
    /// Banner text, if an alert is active.
    pub fn banner(&self) -> Option<String> {
        self.active_alert.as_ref().map(ToString::to_string)
    }

    /// One-line GPS readout.
    pub fn gps_line(&self) -> String {
        match (&self.position_error, self.position) {
            (Some(err), _) => format!("GPS Error: {}", err),
            (None, Some(position)) => format!("GPS: {}", position),
            (None, None) if self.tracking => "Locating...".to_string(),
            (None, None) => "Tracking off".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazard::HazardId;

    #[test]
    fn test_banner() {
        let mut status = SessionStatus::default();
        assert_eq!(status.banner(), None);

        status.active_alert = Some(ActiveAlert {
            hazard_id: HazardId::from_raw(1),
            hazard_name: "Flood".to_string(),
            distance_m: 123.456,
        });
        assert_eq!(
            status.banner().as_deref(),
            Some("Warning: Approaching Flood (Dist: 123.5m)")
        );
    }

    #[test]
    fn test_gps_line() {
        let mut status = SessionStatus {
            tracking: true,
            ..Default::default()
        };
        assert_eq!(status.gps_line(), "Locating...");

        status.position = Some(Coordinate::new(13.75631, 100.50182));
        assert_eq!(status.gps_line(), "GPS: 13.7563, 100.5018");

        status.position_error = Some(ReadingFailure::Timeout);
        assert!(status.gps_line().starts_with("GPS Error:"));
    }
}
