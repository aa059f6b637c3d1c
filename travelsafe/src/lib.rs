//! TravelSafe - Hazard proximity alerts for road travel
//!
//! This library tracks the traveller's position, compares it against an
//! administrator-maintained list of hazard zones, and raises a warning banner
//! plus a rate-limited voice announcement when a hazard comes within range.
//!
//! # Modules
//!
//! - [`coord`]: great-circle distance and bearing
//! - [`position`]: restartable position reading stream
//! - [`hazard`]: hazard records and the hazard store
//! - [`alert`]: proximity alert engine with per-hazard cooldown
//! - [`announce`]: speech output sinks
//! - [`app`]: the session event loop
//! - [`storage`], [`config`], [`logging`], [`telemetry`]: ambient services
//! - [`admin`]: passcode gate for hazard editing
//! - [`services`]: location search and road routing

pub mod admin;
pub mod alert;
pub mod announce;
pub mod app;
pub mod config;
pub mod coord;
pub mod hazard;
pub mod logging;
pub mod position;
pub mod services;
pub mod storage;
pub mod telemetry;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
