//! Price feed error types.

/// Errors that can occur when talking to the fuel-price API.
#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check STATION_API_KEY")]
    Unauthorized,

    /// Rate limited by the price API
    #[error("rate limited by the price API")]
    RateLimited,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl PriceError {
    /// Whether retrying the same request later could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PriceError::Http(_) | PriceError::RateLimited | PriceError::Api { .. }
        )
    }
}
