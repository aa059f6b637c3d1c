//! Geographic coordinate math
//!
//! Provides the great-circle distance used by the proximity alert engine and
//! a bearing helper for log output. Distances are in meters, angles in degrees.

mod types;

pub use types::{CoordError, Coordinate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters (haversine).
///
/// Symmetric and zero for identical points. NaN inputs propagate to a NaN
/// result, which never compares `<=` to any radius.
#[inline]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();

    // abs() keeps the result bit-identical when the arguments are swapped
    let d_phi = (b.latitude - a.latitude).abs().to_radians();
    let d_lambda = (b.longitude - a.longitude).abs().to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    // Rounding can push antipodal points just past 1.0
    let h = if h > 1.0 { 1.0 } else { h };

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial great-circle bearing from `from` to `to`.
///
/// Returns degrees in `[0, 360)`, where 0 = North, 90 = East.
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    let bearing_deg = y.atan2(x).to_degrees();

    // Normalize to 0-360
    (bearing_deg + 360.0) % 360.0
}

/// Compass point (8-wind) for a bearing in degrees.
pub fn compass_point(bearing_deg: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let normalized = bearing_deg.rem_euclid(360.0);
    let index = ((normalized + 22.5) / 45.0) as usize % 8;
    POINTS[index]
}
