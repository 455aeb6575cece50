//! Geographic coordinate type.

use serde::{Deserialize, Serialize};

/// A point on the earth's surface, WGS84 degrees.
///
/// Distance computations in this crate treat the earth as a sphere of
/// radius 6371 km (see [`crate::geo`]), which is accurate to well under a
/// percent over the tens of kilometres a station search spans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat_deg: f64,
    /// Longitude in degrees, positive east.
    pub lon_deg: f64,
}

impl GeoPoint {
    /// Create a point from latitude/longitude in degrees.
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }
}
