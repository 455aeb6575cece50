//! Routing client error types.

use std::fmt;

/// Errors from the directions HTTP client.
#[derive(Debug)]
pub enum RoutingError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code or application-level error
    ApiError { status: u16, message: String },

    /// Request rejected (invalid or missing API key)
    Denied,

    /// Rate limited by the directions API
    RateLimited,
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::Http(e) => write!(f, "HTTP error: {e}"),
            RoutingError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            RoutingError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            RoutingError::Denied => write!(f, "request denied (invalid API key)"),
            RoutingError::RateLimited => write!(f, "rate limited by the directions API"),
        }
    }
}

impl std::error::Error for RoutingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoutingError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        RoutingError::Http(err)
    }
}
