//! HTTP transport for the lookup services.

use std::time::Duration;

use super::ServiceError;

/// User agent sent with every request. Public geocoders reject anonymous clients.
pub const USER_AGENT: &str = concat!("travelsafe/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP GET, injectable so lookups can be tested without a network.
pub trait HttpClient: Send + Sync {
    /// Fetch `url` and return the response body.
    fn get(&self, url: &str) -> Result<Vec<u8>, ServiceError>;
}

/// [`HttpClient`] backed by `reqwest`'s blocking client.
///
/// Must not be called from inside an async runtime thread.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Build a client with the given request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ServiceError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ServiceError::Http(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| ServiceError::Http(format!("Failed to read response: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Canned-response client that records requested URLs.
    pub struct MockHttpClient {
        response: Result<Vec<u8>, ServiceError>,
        requests: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        pub fn ok(body: &str) -> Self {
            Self {
                response: Ok(body.as_bytes().to_vec()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                response: Err(ServiceError::Http("connection refused".to_string())),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    impl HttpClient for MockHttpClient {
        fn get(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
            self.requests.lock().push(url.to_string());
            self.response.clone()
        }
    }

    #[test]
    fn test_mock_client_records_requests() {
        let mock = MockHttpClient::ok("[]");
        assert_eq!(mock.get("http://example.com/a").unwrap(), b"[]".to_vec());
        assert_eq!(mock.requests(), vec!["http://example.com/a".to_string()]);
    }

    #[test]
    fn test_mock_client_error() {
        let mock = MockHttpClient::failing();
        assert!(mock.get("http://example.com").is_err());
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::with_timeout(Duration::from_secs(5)).is_ok());
    }
}
