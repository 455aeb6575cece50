//! Wire types for the directions API.
//!
//! The API speaks the Google Directions / Distance Matrix JSON schema:
//! an HTTP 200 with an application-level `status` string at the top level
//! and, for the matrix, another per element. Distances are metres,
//! durations seconds.

use serde::Deserialize;

/// A road leg: what the ranking pipeline actually consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    /// Road distance in kilometres.
    pub distance_km: f64,
    /// Travel time in seconds.
    pub duration_secs: u32,
}

/// A `{value, text}` pair as the API encodes quantities.
#[derive(Debug, Clone, Deserialize)]
pub struct QuantityDto {
    /// Metres for distances, seconds for durations.
    pub value: u64,
    /// Human-readable rendering; unused but present on the wire.
    #[serde(default)]
    pub text: Option<String>,
}

/// Response of the directions endpoint.
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<RouteDto>,
    pub status: String,
}

/// One route alternative.
#[derive(Debug, Deserialize)]
pub struct RouteDto {
    #[serde(default)]
    pub legs: Vec<LegDto>,
}

/// One leg of a route.
#[derive(Debug, Deserialize)]
pub struct LegDto {
    pub distance: QuantityDto,
    pub duration: QuantityDto,
}

/// Response of the distance-matrix endpoint.
#[derive(Debug, Deserialize)]
pub struct DistanceMatrixResponse {
    #[serde(default)]
    pub rows: Vec<MatrixRowDto>,
    pub status: String,
}

/// One origin row of the matrix.
#[derive(Debug, Deserialize)]
pub struct MatrixRowDto {
    #[serde(default)]
    pub elements: Vec<MatrixElementDto>,
}

/// One origin/destination cell of the matrix.
#[derive(Debug, Deserialize)]
pub struct MatrixElementDto {
    #[serde(default)]
    pub distance: Option<QuantityDto>,
    #[serde(default)]
    pub duration: Option<QuantityDto>,
    pub status: String,
}

impl DirectionsResponse {
    /// Extract the first leg of the first route, if the API found one.
    pub fn first_leg(&self) -> Option<RouteLeg> {
        let leg = self.routes.first()?.legs.first()?;
        Some(RouteLeg {
            distance_km: leg.distance.value as f64 / 1000.0,
            duration_secs: leg.duration.value.min(u32::MAX as u64) as u32,
        })
    }
}

impl MatrixElementDto {
    /// Convert a matrix cell to a leg; `None` unless the element succeeded
    /// and carries both quantities.
    pub fn route_leg(&self) -> Option<RouteLeg> {
        if self.status != "OK" {
            return None;
        }
        let distance = self.distance.as_ref()?;
        let duration = self.duration.as_ref()?;
        Some(RouteLeg {
            distance_km: distance.value as f64 / 1000.0,
            duration_secs: duration.value.min(u32::MAX as u64) as u32,
        })
    }
}
