//! Caching layer for price feed responses.
//!
//! A live session refreshes on a timer and again on every policy change,
//! so identical nearby-station queries can arrive in bursts. Snapping the
//! query position to a coarse grid (0.01 degrees, roughly a kilometre)
//! bounds cache cardinality while keeping entries fresh enough for a
//! moving vehicle.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{FuelKind, GeoPoint, StationCandidate};

use super::client::PriceClient;
use super::error::PriceError;

/// Cache key for nearby queries: (lat bucket, lon bucket, radius in
/// tenths of km, fuel kind, limit).
type NearbyKey = (i32, i32, u32, FuelKind, usize);

/// Cached response entry.
type NearbyEntry = Arc<Vec<StationCandidate>>;

/// Configuration for the price cache.
#[derive(Debug, Clone)]
pub struct PriceCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Grid cell size for position bucketing, degrees.
    pub grid_deg: f64,
}

impl Default for PriceCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 256,
            grid_deg: 0.01,
        }
    }
}

/// Price feed client with response caching.
///
/// Wraps a [`PriceClient`] and caches nearby-station responses.
pub struct CachedPriceClient {
    client: PriceClient,
    cache: MokaCache<NearbyKey, NearbyEntry>,
    grid_deg: f64,
}

impl CachedPriceClient {
    /// Create a new cached client.
    pub fn new(client: PriceClient, config: &PriceCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            client,
            cache,
            grid_deg: config.grid_deg,
        }
    }

    /// Snap a coordinate to its grid cell index.
    fn grid_bucket(&self, deg: f64) -> i32 {
        (deg / self.grid_deg).floor() as i32
    }

    /// Fetch nearby stations, using the cache if a query from the same grid
    /// cell with the same parameters is still fresh.
    pub async fn fetch_nearby(
        &self,
        point: GeoPoint,
        radius_km: f64,
        fuel: FuelKind,
        limit: usize,
    ) -> Result<NearbyEntry, PriceError> {
        let key = (
            self.grid_bucket(point.lat_deg),
            self.grid_bucket(point.lon_deg),
            (radius_km * 10.0).round() as u32,
            fuel,
            limit,
        );

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let candidates = self.client.fetch_nearby(point, radius_km, fuel, limit).await?;

        let entry = Arc::new(candidates);
        self.cache.insert(key, entry.clone()).await;

        Ok(entry)
    }

    /// Number of live cache entries (for monitoring).
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drop all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}
