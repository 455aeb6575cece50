//! Fuel-price API HTTP client.
//!
//! Queries the upstream price feed for stations near a point. The feed
//! returns a JSON array of raw records with every field optional; record
//! validation happens later, in the ranking pipeline.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::domain::{FuelKind, GeoPoint, StationCandidate};

use super::error::PriceError;

/// Default base URL for the price feed.
const DEFAULT_BASE_URL: &str = "https://api.prezzi-carburante.it/v1";

/// Configuration for the price feed client.
#[derive(Debug, Clone)]
pub struct PriceClientConfig {
    /// API key for X-API-Key header authentication
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl PriceClientConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the fuel-price API.
#[derive(Debug, Clone)]
pub struct PriceClient {
    http: reqwest::Client,
    base_url: String,
}

impl PriceClient {
    /// Create a new price feed client.
    pub fn new(config: PriceClientConfig) -> Result<Self, PriceError> {
        let mut headers = HeaderMap::new();

        let api_key_header = HeaderValue::from_str(&config.api_key).map_err(|_| PriceError::Api {
            status: 0,
            message: "Invalid API key format".to_string(),
        })?;
        headers.insert(HeaderName::from_static("x-api-key"), api_key_header);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch raw station records near a point.
    ///
    /// `radius_km` is passed upstream as a query constraint; the pipeline
    /// re-checks it anyway. `limit` bounds the response size.
    pub async fn fetch_nearby(
        &self,
        point: GeoPoint,
        radius_km: f64,
        fuel: FuelKind,
        limit: usize,
    ) -> Result<Vec<StationCandidate>, PriceError> {
        let url = format!("{}/stations/nearby", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", point.lat_deg.to_string()),
                ("lon", point.lon_deg.to_string()),
                ("radius", radius_km.to_string()),
                ("fuel_type", fuel.as_str().to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(PriceError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PriceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| PriceError::Json {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = PriceClientConfig::new("test-api-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_builder() {
        let config = PriceClientConfig::new("test-api-key")
            .with_base_url("http://localhost:8080")
            .with_timeout(5);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn client_creation() {
        let config = PriceClientConfig::new("test-api-key");
        assert!(PriceClient::new(config).is_ok());
    }

    #[test]
    fn client_rejects_unprintable_api_key() {
        let config = PriceClientConfig::new("bad\nkey");
        assert!(PriceClient::new(config).is_err());
    }
}
