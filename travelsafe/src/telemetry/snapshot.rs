//! Point-in-time copy of session counters.

use std::fmt;
use std::time::Duration;

/// Session counters at one moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub uptime: Duration,
    pub readings_ok: u64,
    pub readings_failed: u64,
    pub evaluations: u64,
    pub alerts_raised: u64,
    pub announcements: u64,
    pub announcement_failures: u64,
    pub hazards_added: u64,
    pub hazards_removed: u64,
}

impl TelemetrySnapshot {
    pub fn total_readings(&self) -> u64 {
        self.readings_ok + self.readings_failed
    }

    /// Fraction of readings that carried a position, 0.0 with no readings.
    pub fn fix_rate(&self) -> f64 {
        match self.total_readings() {
            0 => 0.0,
            total => self.readings_ok as f64 / total as f64,
        }
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session time:    {}s", self.uptime.as_secs())?;
        writeln!(
            f,
            "Readings:        {} ({} failed, {:.0}% fixes)",
            self.total_readings(),
            self.readings_failed,
            self.fix_rate() * 100.0
        )?;
        writeln!(
            f,
            "Evaluations:     {} ({} with alert)",
            self.evaluations, self.alerts_raised
        )?;
        write!(
            f,
            "Announcements:   {} ({} failed)",
            self.announcements, self.announcement_failures
        )
    }
}
