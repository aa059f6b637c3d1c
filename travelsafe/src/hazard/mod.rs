//! Hazard records and the hazard store.
//!
//! Hazards are administrator-defined points with a fixed alert radius. The
//! [`HazardStore`] owns the ordered list; the alert engine only ever sees an
//! immutable [`HazardSnapshot`] taken at evaluation time.
//!
//! # Identity
//!
//! A hazard is identified by its [`HazardId`]. Names and positions may repeat.
//! Ids come from a monotonic counter that is seeded above every id already in
//! the store, so hazards added in the same process never collide, including
//! after a reload from disk.

mod draft;
mod store;

pub use draft::HazardDraft;
pub use store::{HazardSnapshot, HazardStore};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{CoordError, Coordinate};

/// Opaque hazard identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HazardId(u64);

impl HazardId {
    /// Wrap a raw id value (used when loading persisted hazards).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HazardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for HazardId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// An administrator-defined hazard zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    /// Unique identifier.
    pub id: HazardId,
    /// Human-readable name, spoken in announcements.
    pub name: String,
    /// Center of the hazard zone.
    pub position: Coordinate,
}

impl Hazard {
    /// Create a hazard record.
    pub fn new(id: HazardId, name: impl Into<String>, position: Coordinate) -> Self {
        Self {
            id,
            name: name.into(),
            position,
        }
    }
}

/// Invalid administrator input, rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HazardError {
    /// The hazard name is missing or blank.
    #[error("Hazard name is required")]
    EmptyName,

    /// A coordinate field was left empty.
    #[error("Missing {0} coordinate")]
    MissingCoordinate(&'static str),

    /// A coordinate field is not a number.
    #[error("Invalid {field} value '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    /// A coordinate component is NaN or infinite.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordError),

    /// Every id up to `u64::MAX` is taken.
    #[error("No hazard ids left to assign")]
    IdSpaceExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazard_json_shape() {
        let hazard = Hazard::new(
            HazardId::from_raw(1),
            "Construction Zone",
            Coordinate::new(13.7573, 100.5028),
        );
        let json = serde_json::to_string(&hazard).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"name":"Construction Zone","position":{"lat":13.7573,"lng":100.5028}}"#
        );
    }

    #[test]
    fn test_hazard_id_parse() {
        let id: HazardId = " 42 ".parse().unwrap();
        assert_eq!(id, HazardId::from_raw(42));
        assert!("abc".parse::<HazardId>().is_err());
    }

    #[test]
    fn test_hazard_error_display() {
        let err = HazardError::InvalidNumber {
            field: "latitude",
            value: "north".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid latitude value 'north'");
    }
}
