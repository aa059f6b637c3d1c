//! Unvalidated hazard input from the admin form.

use super::HazardError;
use crate::coord::Coordinate;

/// Hazard fields as the administrator typed them.
///
/// The admin form collects free text for all three fields (the map picker
/// fills the coordinate fields in for you). Nothing enters the store until
/// [`HazardDraft::validate`] succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HazardDraft {
    pub name: String,
    pub lat: String,
    pub lng: String,
}

impl HazardDraft {
    /// Create a draft from raw text fields.
    pub fn new(name: impl Into<String>, lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat: lat.into(),
            lng: lng.into(),
        }
    }

    /// Create a draft from an already-picked map position.
    pub fn at(name: impl Into<String>, position: Coordinate) -> Self {
        Self {
            name: name.into(),
            lat: position.latitude.to_string(),
            lng: position.longitude.to_string(),
        }
    }

    /// Check the fields and return the trimmed name and parsed position.
    pub fn validate(&self) -> Result<(String, Coordinate), HazardError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(HazardError::EmptyName);
        }

        let latitude = parse_field("latitude", &self.lat)?;
        let longitude = parse_field("longitude", &self.lng)?;
        let position = Coordinate::try_new(latitude, longitude)?;

        Ok((name.to_string(), position))
    }
}

fn parse_field(field: &'static str, raw: &str) -> Result<f64, HazardError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(HazardError::MissingCoordinate(field));
    }
    raw.parse().map_err(|_| HazardError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}
