//! Position readings produced by the position source.

use std::fmt;
use std::time::Instant;

use crate::coord::Coordinate;

/// Why a reading could not produce a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingFailure {
    /// The host has no location capability. Permanent.
    Unsupported,
    /// The user or OS refused access to location.
    PermissionDenied,
    /// A fix attempt exceeded the configured timeout.
    Timeout,
    /// The capability returned a fix older than the accepted cache age.
    Stale,
    /// Any other transient failure reported by the capability.
    Unavailable(String),
}

impl ReadingFailure {
    /// Whether the source will keep trying after this failure.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ReadingFailure::Unsupported)
    }
}

impl fmt::Display for ReadingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingFailure::Unsupported => write!(f, "Geolocation is not supported by this host"),
            ReadingFailure::PermissionDenied => write!(f, "Location permission denied"),
            ReadingFailure::Timeout => write!(f, "Timed out waiting for a location fix"),
            ReadingFailure::Stale => write!(f, "Location fix is too old"),
            ReadingFailure::Unavailable(msg) => write!(f, "Location unavailable: {}", msg),
        }
    }
}

/// One sample of the user's location, successful or failed.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionReading {
    /// A position fix.
    Known {
        coordinate: Coordinate,
        /// When the fix was taken (monotonic clock).
        timestamp: Instant,
    },
    /// No position could be determined.
    Unknown { reason: ReadingFailure },
}

impl PositionReading {
    /// A fix taken now.
    pub fn known(coordinate: Coordinate) -> Self {
        Self::Known {
            coordinate,
            timestamp: Instant::now(),
        }
    }

    /// A failed reading.
    pub fn unknown(reason: ReadingFailure) -> Self {
        Self::Unknown { reason }
    }

    /// The coordinate if this reading is a fix.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            PositionReading::Known { coordinate, .. } => Some(*coordinate),
            PositionReading::Unknown { .. } => None,
        }
    }

    /// The failure reason if this reading failed.
    pub fn failure(&self) -> Option<&ReadingFailure> {
        match self {
            PositionReading::Known { .. } => None,
            PositionReading::Unknown { reason } => Some(reason),
        }
    }

    /// Whether this reading is a fix.
    pub fn is_known(&self) -> bool {
        matches!(self, PositionReading::Known { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_reading_accessors() {
        let reading = PositionReading::known(Coordinate::new(1.0, 2.0));
        assert!(reading.is_known());
        assert_eq!(reading.coordinate(), Some(Coordinate::new(1.0, 2.0)));
        assert!(reading.failure().is_none());
    }

    #[test]
    fn test_unknown_reading_accessors() {
        let reading = PositionReading::unknown(ReadingFailure::Timeout);
        assert!(!reading.is_known());
        assert!(reading.coordinate().is_none());
        assert_eq!(reading.failure(), Some(&ReadingFailure::Timeout));
    }

    #[test]
    fn test_only_unsupported_is_permanent() {
        assert!(!ReadingFailure::Unsupported.is_recoverable());
        assert!(ReadingFailure::Timeout.is_recoverable());
        assert!(ReadingFailure::Stale.is_recoverable());
        assert!(ReadingFailure::PermissionDenied.is_recoverable());
        assert!(ReadingFailure::Unavailable("gps off".into()).is_recoverable());
    }
}
