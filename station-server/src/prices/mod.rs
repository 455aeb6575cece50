//! Fuel-price API client and caching.
//!
//! The upstream feed answers "stations near (lat, lon) selling this fuel"
//! with raw, all-optional records. This module provides the HTTP client, a
//! response cache bucketed on a coarse position grid, and an in-memory mock
//! for development without an API key.

mod cache;
mod client;
mod error;
mod mock;

pub use cache::{CachedPriceClient, PriceCacheConfig};
pub use client::{PriceClient, PriceClientConfig};
pub use error::PriceError;
pub use mock::MockPriceClient;

/// Station source chosen at startup: the real (cached) feed when an API key
/// is configured, the in-memory mock otherwise.
pub enum StationFeed {
    Cached(CachedPriceClient),
    Mock(MockPriceClient),
}
