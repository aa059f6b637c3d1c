//! Atomic session counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::TelemetrySnapshot;

/// Counters for one tracking session.
#[derive(Debug)]
pub struct SessionMetrics {
    started: Instant,
    readings_ok: AtomicU64,
    readings_failed: AtomicU64,
    evaluations: AtomicU64,
    /// Evaluations that produced an active alert.
    alerts_raised: AtomicU64,
    announcements: AtomicU64,
    announcement_failures: AtomicU64,
    hazards_added: AtomicU64,
    hazards_removed: AtomicU64,
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            readings_ok: AtomicU64::new(0),
            readings_failed: AtomicU64::new(0),
            evaluations: AtomicU64::new(0),
            alerts_raised: AtomicU64::new(0),
            announcements: AtomicU64::new(0),
            announcement_failures: AtomicU64::new(0),
            hazards_added: AtomicU64::new(0),
            hazards_removed: AtomicU64::new(0),
        }
    }

    /// Record a position reading.
    pub fn reading_received(&self, known: bool) {
        if known {
            self.readings_ok.fetch_add(1, Ordering::Relaxed);
        } else {
            self.readings_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record one engine evaluation.
    pub fn evaluation_completed(&self, alert_active: bool) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        if alert_active {
            self.alerts_raised.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn announcement_made(&self) {
        self.announcements.fetch_add(1, Ordering::Relaxed);
    }

    pub fn announcement_failed(&self) {
        self.announcement_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hazard_added(&self) {
        self.hazards_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hazard_removed(&self) {
        self.hazards_removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            uptime: self.started.elapsed(),
            readings_ok: self.readings_ok.load(Ordering::Relaxed),
            readings_failed: self.readings_failed.load(Ordering::Relaxed),
            evaluations: self.evaluations.load(Ordering::Relaxed),
            alerts_raised: self.alerts_raised.load(Ordering::Relaxed),
            announcements: self.announcements.load(Ordering::Relaxed),
            announcement_failures: self.announcement_failures.load(Ordering::Relaxed),
            hazards_added: self.hazards_added.load(Ordering::Relaxed),
            hazards_removed: self.hazards_removed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters() {
        let metrics = SessionMetrics::new();
        metrics.reading_received(true);
        metrics.reading_received(true);
        metrics.reading_received(false);
        metrics.evaluation_completed(false);
        metrics.evaluation_completed(true);
        metrics.announcement_made();
        metrics.announcement_failed();
        metrics.hazard_added();
        metrics.hazard_removed();

        let s = metrics.snapshot();
        assert_eq!(s.readings_ok, 2);
        assert_eq!(s.readings_failed, 1);
        assert_eq!(s.evaluations, 2);
        assert_eq!(s.alerts_raised, 1);
        assert_eq!(s.announcements, 1);
        assert_eq!(s.announcement_failures, 1);
        assert_eq!(s.hazards_added, 1);
        assert_eq!(s.hazards_removed, 1);
    }

    #[test]
    fn test_concurrent_recording() {
        let metrics = Arc::new(SessionMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.reading_received(true);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.snapshot().readings_ok, 4000);
    }
}
