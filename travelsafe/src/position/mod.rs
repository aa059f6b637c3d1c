//! Live position tracking.
//!
//! Turns a host location capability into a continuing, restartable stream of
//! [`PositionReading`] values consumed by the session event loop.
//!
//! # Architecture
//!
//! ```text
//! LocationProvider ──► poll task ──► mpsc ──► PositionSource::next_reading()
//!  (one fix per call)   (interval,            (session select! loop)
//!                        timeout,
//!                        staleness)
//! ```
//!
//! Failures never end the stream except [`ReadingFailure::Unsupported`],
//! which is reported once and is permanent.

mod provider;
mod reading;
mod source;

pub use provider::{
    Fix, FixRequest, FixedLocation, LocationError, LocationProvider, NoLocation, ReplayLocation,
    TrackFileError,
};
pub use reading::{PositionReading, ReadingFailure};
pub use source::{
    PositionSource, TrackingConfig, DEFAULT_FIX_TIMEOUT, DEFAULT_MAX_CACHE_AGE,
    DEFAULT_POLL_INTERVAL,
};
