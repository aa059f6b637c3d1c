//! Location capability abstraction.
//!
//! The position source depends on the [`LocationProvider`] trait, not on any
//! concrete positioning backend. Providers answer single fix requests; the
//! [`PositionSource`](super::PositionSource) turns those into a continuing
//! stream with timeouts and staleness checks.

use std::path::Path;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use parking_lot::Mutex;
use thiserror::Error;

use super::ReadingFailure;
use crate::coord::Coordinate;

/// Parameters for one fix request.
#[derive(Debug, Clone, PartialEq)]
pub struct FixRequest {
    /// Ask for the most accurate fix available.
    pub high_accuracy: bool,
    /// Oldest cached fix the caller will accept.
    pub max_cache_age: Duration,
    /// How long the caller will wait for a fix.
    pub timeout: Duration,
}

/// A position fix returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// When the fix was actually taken. Cached fixes carry an older instant.
    pub timestamp: Instant,
    /// Estimated horizontal accuracy in meters, if known.
    pub accuracy_m: Option<f64>,
}

impl Fix {
    /// A fix taken now with unknown accuracy.
    pub fn now(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            timestamp: Instant::now(),
            accuracy_m: None,
        }
    }
}

/// Errors reported by a location provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The host has no location capability.
    #[error("Location capability not supported")]
    Unsupported,

    /// Access to location was refused.
    #[error("Location permission denied")]
    PermissionDenied,

    /// Transient failure (no satellites, device busy, ...).
    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

impl From<LocationError> for ReadingFailure {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::Unsupported => ReadingFailure::Unsupported,
            LocationError::PermissionDenied => ReadingFailure::PermissionDenied,
            LocationError::Unavailable(msg) => ReadingFailure::Unavailable(msg),
        }
    }
}

/// Location capability of the host.
pub trait LocationProvider: Send + Sync {
    /// Whether the host has a location capability at all.
    fn is_supported(&self) -> bool;

    /// Request one position fix.
    fn current_fix<'a>(&'a self, request: &'a FixRequest) -> BoxFuture<'a, Result<Fix, LocationError>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Provider that always reports the same (settable) position.
#[derive(Debug)]
pub struct FixedLocation {
    position: Mutex<Coordinate>,
}

impl FixedLocation {
    /// Create a provider fixed at `position`.
    pub fn new(position: Coordinate) -> Self {
        Self {
            position: Mutex::new(position),
        }
    }

    /// Move the reported position.
    pub fn set(&self, position: Coordinate) {
        *self.position.lock() = position;
    }
}

impl LocationProvider for FixedLocation {
    fn is_supported(&self) -> bool {
        true
    }

    fn current_fix<'a>(&'a self, _request: &'a FixRequest) -> BoxFuture<'a, Result<Fix, LocationError>> {
        let position = *self.position.lock();
        Box::pin(async move { Ok(Fix::now(position)) })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Provider for a host without location capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn is_supported(&self) -> bool {
        false
    }

    fn current_fix<'a>(&'a self, _request: &'a FixRequest) -> BoxFuture<'a, Result<Fix, LocationError>> {
        Box::pin(async { Err(LocationError::Unsupported) })
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Errors loading a replay track.
#[derive(Debug, Error)]
pub enum TrackFileError {
    #[error("Failed to read track file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse track file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Track file contains no positions")]
    Empty,
}

/// Provider that replays a recorded track, one position per request.
///
/// After the last point it keeps reporting the final position.
#[derive(Debug)]
pub struct ReplayLocation {
    track: Vec<Coordinate>,
    cursor: Mutex<usize>,
}

impl ReplayLocation {
    /// Create a replay provider from a list of positions.
    pub fn new(track: Vec<Coordinate>) -> Result<Self, TrackFileError> {
        if track.is_empty() {
            return Err(TrackFileError::Empty);
        }
        Ok(Self {
            track,
            cursor: Mutex::new(0),
        })
    }

    /// Load a JSON track file: an array of `{"lat": .., "lng": ..}` objects.
    pub fn from_file(path: &Path) -> Result<Self, TrackFileError> {
        let data = std::fs::read_to_string(path)?;
        let track: Vec<Coordinate> = serde_json::from_str(&data)?;
        tracing::info!(path = %path.display(), points = track.len(), "Loaded replay track");
        Self::new(track)
    }

    /// Number of points in the track.
    pub fn len(&self) -> usize {
        self.track.len()
    }

    /// Whether the track is empty (never true for a constructed provider).
    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }

    fn next_position(&self) -> Coordinate {
        let mut cursor = self.cursor.lock();
        let position = self.track[(*cursor).min(self.track.len() - 1)];
        if *cursor < self.track.len() {
            *cursor += 1;
        }
        position
    }
}

impl LocationProvider for ReplayLocation {
    fn is_supported(&self) -> bool {
        true
    }

    fn current_fix<'a>(&'a self, _request: &'a FixRequest) -> BoxFuture<'a, Result<Fix, LocationError>> {
        let position = self.next_position();
        Box::pin(async move { Ok(Fix::now(position)) })
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}
