//! Location search and road routing over HTTP.
//!
//! Both lookups degrade instead of failing: a search error yields no places
//! and a routing error yields no road path, which callers replace with a
//! straight line between the endpoints.
//!
//! ```text
//! Geocoder ──┐
//!            ├──► HttpClient ──► Nominatim / OSRM
//! Router ────┘    (ReqwestClient, or a mock in tests)
//! ```

mod geocode;
mod http;
mod route;

pub use geocode::{Geocoder, Place, MIN_QUERY_LEN, SEARCH_LIMIT};
pub use http::{HttpClient, ReqwestClient, USER_AGENT};
pub use route::{straight_line, RoutePath, RouteSource, Router};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Default Nominatim search endpoint.
pub const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Default OSRM driving route endpoint.
pub const DEFAULT_ROUTE_URL: &str = "https://router.project-osrm.org/route/v1/driving";

/// Default request timeout.
pub const DEFAULT_SERVICE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the lookup services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The routing service answered but found no route.
    #[error("No route: {0}")]
    NoRoute(String),
}

/// Endpoints and timeout for the lookup services.
#[derive(Debug, Clone, PartialEq)]
pub struct ServicesConfig {
    pub geocode_url: String,
    pub route_url: String,
    pub timeout: Duration,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            route_url: DEFAULT_ROUTE_URL.to_string(),
            timeout: DEFAULT_SERVICE_TIMEOUT,
        }
    }
}

impl ServicesConfig {
    /// Build a geocoder and router sharing one reqwest client.
    pub fn build(&self) -> Result<(Geocoder, Router), ServiceError> {
        let client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::with_timeout(self.timeout)?);
        Ok((
            Geocoder::new(Arc::clone(&client), &self.geocode_url),
            Router::new(client, &self.route_url),
        ))
    }
}
