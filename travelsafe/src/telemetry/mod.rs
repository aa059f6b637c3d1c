//! Session telemetry for observability and user feedback.
//!
//! Counters are lock-free atomics so the session loop and the position task
//! can record events without contention. Views read a point-in-time
//! [`TelemetrySnapshot`].
//!
//! # Architecture
//!
//! ```text
//! Session loop ─────► SessionMetrics ─────► TelemetrySnapshot ─────► Views
//!                     (atomic counters)     (point-in-time copy)     (CLI summary)
//! ```
//!
//! # Example
//!
//! ```
//! use travelsafe::telemetry::SessionMetrics;
//!
//! let metrics = SessionMetrics::new();
//! metrics.reading_received(true);
//! metrics.evaluation_completed(true);
//! metrics.announcement_made();
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.readings_ok, 1);
//! assert_eq!(snapshot.alerts_raised, 1);
//! ```

mod metrics;
mod snapshot;

pub use metrics::SessionMetrics;
pub use snapshot::TelemetrySnapshot;
