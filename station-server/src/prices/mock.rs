//! Mock price feed for development and testing without API access.
//!
//! Serves a fixed set of station records as if they came from the live
//! feed, applying the same radius and limit constraints the feed applies
//! server-side.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{FuelKind, GeoPoint, StationCandidate};
use crate::geo;

use super::error::PriceError;

/// Mock price feed backed by an in-memory record list.
#[derive(Clone, Default)]
pub struct MockPriceClient {
    stations: Arc<RwLock<Vec<StationCandidate>>>,
}

impl MockPriceClient {
    /// Create a mock feed serving the given records.
    pub fn new(stations: Vec<StationCandidate>) -> Self {
        Self {
            stations: Arc::new(RwLock::new(stations)),
        }
    }

    /// Replace the served records (useful between test phases).
    pub async fn set_stations(&self, stations: Vec<StationCandidate>) {
        *self.stations.write().await = stations;
    }

    /// Fetch records near a point.
    ///
    /// Mimics the live feed: records inside `radius_km` of `point`, at most
    /// `limit` of them. Records without coordinates are passed through —
    /// the live feed makes no validity promises, and the pipeline must
    /// cope either way.
    pub async fn fetch_nearby(
        &self,
        point: GeoPoint,
        radius_km: f64,
        _fuel: FuelKind,
        limit: usize,
    ) -> Result<Vec<StationCandidate>, PriceError> {
        let stations = self.stations.read().await;

        let nearby: Vec<StationCandidate> = stations
            .iter()
            .filter(|c| match (c.latitude, c.longitude) {
                (Some(lat), Some(lon)) => {
                    geo::haversine_km(point, GeoPoint::new(lat, lon)) <= radius_km
                }
                _ => true,
            })
            .take(limit)
            .cloned()
            .collect();

        Ok(nearby)
    }
}
