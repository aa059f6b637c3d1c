//! Free-text location search.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::{HttpClient, ServiceError};
use crate::coord::Coordinate;

/// Queries shorter than this (in characters) are not sent.
pub const MIN_QUERY_LEN: usize = 2;

/// Maximum number of places returned per search.
pub const SEARCH_LIMIT: usize = 5;

/// A search result.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Geocoder's identifier for the place.
    pub id: u64,
    /// Full display name.
    pub name: String,
    pub coordinate: Coordinate,
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.coordinate)
    }
}

/// Nominatim result entry. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: u64,
    display_name: String,
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn into_place(self) -> Option<Place> {
        let lat = self.lat.parse::<f64>().ok()?;
        let lon = self.lon.parse::<f64>().ok()?;
        let coordinate = Coordinate::try_new(lat, lon).ok()?;
        Some(Place {
            id: self.place_id,
            name: self.display_name,
            coordinate,
        })
    }
}

/// Location search client.
pub struct Geocoder {
    client: Arc<dyn HttpClient>,
    base_url: String,
}

impl fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geocoder")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Geocoder {
    pub fn new(client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Search for places matching `query`.
    ///
    /// Short queries and any lookup failure yield an empty list; failures are
    /// logged.
    pub fn search_locations(&self, query: &str) -> Vec<Place> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        match self.try_search(query) {
            Ok(places) => {
                tracing::debug!(query, results = places.len(), "Location search complete");
                places
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Location search failed");
                Vec::new()
            }
        }
    }

    /// Search without swallowing errors.
    pub fn try_search(&self, query: &str) -> Result<Vec<Place>, ServiceError> {
        let limit = SEARCH_LIMIT.to_string();
        let url = reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("format", "json"),
                ("q", query),
                ("limit", limit.as_str()),
                ("addressdetails", "1"),
            ],
        )
        .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        let body = self.client.get(url.as_str())?;
        parse_places(&body)
    }
}

fn parse_places(body: &[u8]) -> Result<Vec<Place>, ServiceError> {
    let raw: Vec<NominatimPlace> =
        serde_json::from_slice(body).map_err(|e| ServiceError::Decode(e.to_string()))?;

    Ok(raw
        .into_iter()
        .filter_map(NominatimPlace::into_place)
        .take(SEARCH_LIMIT)
        .collect())
}
