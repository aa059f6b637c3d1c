//! Road routing with straight-line fallback.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::{HttpClient, ServiceError};
use crate::coord::{self, Coordinate};

/// Where a route's geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    /// Road geometry from the routing service.
    Road,
    /// Direct line between the endpoints.
    StraightLine,
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSource::Road => write!(f, "road"),
            RouteSource::StraightLine => write!(f, "straight line"),
        }
    }
}

/// A drawable route.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    pub points: Vec<Coordinate>,
    pub source: RouteSource,
}

impl RoutePath {
    /// Sum of great-circle distances between consecutive points, in meters.
    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| coord::distance(pair[0], pair[1]))
            .sum()
    }
}

/// Two-point path from `start` to `end`.
pub fn straight_line(start: Coordinate, end: Coordinate) -> RoutePath {
    RoutePath {
        points: vec![start, end],
        source: RouteSource::StraightLine,
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

/// GeoJSON line string. Positions are `[lng, lat]`.
#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// Road routing client.
pub struct Router {
    client: Arc<dyn HttpClient>,
    base_url: String,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Router {
    pub fn new(client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Road path from `start` to `end`, or `None` if the lookup fails.
    pub fn road_route(&self, start: Coordinate, end: Coordinate) -> Option<Vec<Coordinate>> {
        match self.try_route(start, end) {
            Ok(points) => Some(points),
            Err(e) => {
                tracing::warn!(from = %start, to = %end, error = %e, "Road routing failed");
                None
            }
        }
    }

    /// Road path if available, otherwise the straight line.
    pub fn route_or_straight(&self, start: Coordinate, end: Coordinate) -> RoutePath {
        match self.road_route(start, end) {
            Some(points) => RoutePath {
                points,
                source: RouteSource::Road,
            },
            None => straight_line(start, end),
        }
    }

    /// Road path without swallowing errors.
    pub fn try_route(&self, start: Coordinate, end: Coordinate) -> Result<Vec<Coordinate>, ServiceError> {
        let url = format!(
            "{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url.trim_end_matches('/'),
            start.longitude,
            start.latitude,
            end.longitude,
            end.latitude
        );

        let body = self.client.get(&url)?;
        parse_route(&body)
    }
}

fn parse_route(body: &[u8]) -> Result<Vec<Coordinate>, ServiceError> {
    let response: OsrmResponse =
        serde_json::from_slice(body).map_err(|e| ServiceError::Decode(e.to_string()))?;

    if response.code != "Ok" {
        return Err(ServiceError::NoRoute(
            response.message.unwrap_or(response.code),
        ));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::NoRoute("empty route list".to_string()))?;

    let points: Vec<Coordinate> = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| Coordinate::new(lat, lng))
        .collect();

    if points.is_empty() {
        return Err(ServiceError::NoRoute("empty geometry".to_string()));
    }
    Ok(points)
}
