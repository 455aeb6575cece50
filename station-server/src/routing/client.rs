//! Directions HTTP client.
//!
//! Provides async road-distance lookups: a single origin/destination pair
//! via the directions endpoint, or one origin against many destinations via
//! the distance-matrix endpoint. A semaphore bounds concurrent requests to
//! stay under the API's rate limits.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::domain::GeoPoint;

use super::error::RoutingError;
use super::types::{DirectionsResponse, DistanceMatrixResponse, RouteLeg};

/// Default base URL for the directions API.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Render a point in the API's `lat,lon` wire form.
fn wire_point(p: GeoPoint) -> String {
    format!("{},{}", p.lat_deg, p.lon_deg)
}

/// Configuration for the routing client.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// API key, passed as the `key` query parameter
    pub api_key: String,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RoutingConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Directions API client.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl RoutingClient {
    /// Create a new routing client with the given configuration.
    pub fn new(config: RoutingConfig) -> Result<Self, RoutingError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Road distance and duration between two points.
    ///
    /// `Ok(None)` means the API answered but found no route; callers fall
    /// back to air distance for that destination.
    pub async fn fetch_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<RouteLeg>, RoutingError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RoutingError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/directions/json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("origin", wire_point(origin)),
                ("destination", wire_point(destination)),
                ("mode", "driving".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RoutingError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RoutingError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let directions: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        match directions.status.as_str() {
            "OK" => Ok(directions.first_leg()),
            "ZERO_RESULTS" => Ok(None),
            "OVER_QUERY_LIMIT" => Err(RoutingError::RateLimited),
            "REQUEST_DENIED" => Err(RoutingError::Denied),
            other => Err(RoutingError::ApiError {
                status: 0,
                message: other.to_string(),
            }),
        }
    }

    /// Road distances from one origin to many destinations in one request.
    ///
    /// The result has exactly one entry per destination, in input order;
    /// a failed element is `None` and never affects its siblings.
    pub async fn fetch_route_matrix(
        &self,
        origin: GeoPoint,
        destinations: &[GeoPoint],
    ) -> Result<Vec<Option<RouteLeg>>, RoutingError> {
        if destinations.is_empty() {
            return Ok(Vec::new());
        }

        // For a single destination the directions endpoint answers the same
        // question at a lower billing tier.
        if destinations.len() == 1 {
            let leg = self.fetch_route(origin, destinations[0]).await?;
            return Ok(vec![leg]);
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RoutingError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/distancematrix/json", self.base_url);

        let destinations_wire = destinations
            .iter()
            .map(|d| wire_point(*d))
            .collect::<Vec<_>>()
            .join("|");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("origins", wire_point(origin)),
                ("destinations", destinations_wire),
                ("mode", "driving".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RoutingError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RoutingError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let matrix: DistanceMatrixResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        match matrix.status.as_str() {
            "OK" => {}
            "OVER_QUERY_LIMIT" => return Err(RoutingError::RateLimited),
            "REQUEST_DENIED" => return Err(RoutingError::Denied),
            other => {
                return Err(RoutingError::ApiError {
                    status: 0,
                    message: other.to_string(),
                });
            }
        }

        // One row per origin; we always send exactly one.
        let elements = matrix
            .rows
            .first()
            .map(|row| row.elements.as_slice())
            .unwrap_or_default();

        let mut legs: Vec<Option<RouteLeg>> =
            elements.iter().map(|e| e.route_leg()).collect();
        legs.resize(destinations.len(), None);

        Ok(legs)
    }
}
