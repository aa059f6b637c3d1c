//! Coordinate types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Valid latitude range for display and validation helpers.
pub const MIN_LAT: f64 = -90.0;
/// Maximum latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum longitude in degrees.
pub const MIN_LON: f64 = -180.0;
/// Maximum longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors from coordinate construction and parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is NaN or infinite.
    #[error("Latitude is not a finite number: {0}")]
    NonFiniteLatitude(f64),

    /// Longitude is NaN or infinite.
    #[error("Longitude is not a finite number: {0}")]
    NonFiniteLongitude(f64),

    /// Text could not be parsed as `lat,lng`.
    #[error("Invalid coordinate '{0}': expected 'lat,lng'")]
    Parse(String),
}

/// A WGS84 latitude/longitude pair in degrees.
///
/// Only finiteness is checked by [`Coordinate::try_new`]; out-of-range values
/// are accepted and simply produce large distances. Serializes as
/// `{"lat": .., "lng": ..}`, the shape used by the hazard list on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate without validation.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, rejecting NaN and infinite components.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !latitude.is_finite() {
            return Err(CoordError::NonFiniteLatitude(latitude));
        }
        if !longitude.is_finite() {
            return Err(CoordError::NonFiniteLongitude(longitude));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Whether the coordinate lies inside the conventional WGS84 ranges.
    pub fn is_in_range(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.latitude)
            && (MIN_LON..=MAX_LON).contains(&self.longitude)
    }

    /// Shift this coordinate by a number of meters north and east.
    ///
    /// Uses a local equirectangular approximation, which is accurate to well
    /// under a meter for offsets of a few kilometers away from the poles.
    pub fn offset_by_meters(&self, north_m: f64, east_m: f64) -> Self {
        let dlat = (north_m / super::EARTH_RADIUS_M).to_degrees();
        let dlon =
            (east_m / (super::EARTH_RADIUS_M * self.latitude.to_radians().cos())).to_degrees();
        Self::new(self.latitude + dlat, self.longitude + dlon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = CoordError;

    /// Parse `lat,lng` (whitespace around either part is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| CoordError::Parse(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordError::Parse(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| CoordError::Parse(s.to_string()))?;
        Self::try_new(lat, lng)
    }
}
