//! Data transfer objects for web requests and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FuelKind, FuelStation, GeoPoint, LocationSample};
use crate::ranker::UsedMode;
use crate::session::SessionSnapshot;

/// A location fix delivered by the platform location collaborator.
#[derive(Debug, Deserialize)]
pub struct LocationUpdateRequest {
    /// Latitude in degrees
    pub lat_deg: f64,

    /// Longitude in degrees
    pub lon_deg: f64,

    /// Compass heading, degrees clockwise from north
    pub heading_deg: Option<f64>,

    /// Estimated heading accuracy, degrees
    pub heading_accuracy_deg: Option<f64>,

    /// Ground speed, metres per second
    pub speed_mps: Option<f64>,

    /// Fix timestamp; defaults to the server clock
    pub timestamp: Option<DateTime<Utc>>,
}

impl LocationUpdateRequest {
    /// Convert to a domain sample, stamping `now` when the fix carries no
    /// timestamp of its own.
    pub fn into_sample(self, now: DateTime<Utc>) -> LocationSample {
        LocationSample {
            point: GeoPoint::new(self.lat_deg, self.lon_deg),
            heading_deg: self.heading_deg.map(|h| h.rem_euclid(360.0)),
            heading_accuracy_deg: self.heading_accuracy_deg,
            speed_mps: self.speed_mps,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

/// Session state after a control operation.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Whether the live search is running
    pub active: bool,
}

/// One station in the ranked list.
#[derive(Debug, Serialize)]
pub struct StationView {
    /// Cycle-local station id
    pub id: String,

    /// Operator / brand name
    pub name: String,

    /// Street address
    pub address: String,

    /// Latitude in degrees
    pub lat_deg: f64,

    /// Longitude in degrees
    pub lon_deg: f64,

    /// Price per fuel kind, EUR per litre
    pub prices: BTreeMap<FuelKind, f64>,

    /// Straight-line distance from the user, km
    pub air_distance_km: Option<f64>,

    /// Road distance, km (absent until the routing collaborator answers)
    pub route_distance_km: Option<f64>,

    /// Road travel time, seconds
    pub route_duration_secs: Option<u32>,

    /// Relative age of the upstream price stamp, e.g. "3 hours ago"
    pub last_update: Option<String>,
}

impl StationView {
    /// Build a view from a ranked station.
    pub fn from_station(station: &FuelStation, now: DateTime<Utc>) -> Self {
        Self {
            id: station.id.to_string(),
            name: station.name.clone(),
            address: station.address.clone(),
            lat_deg: station.point.lat_deg,
            lon_deg: station.point.lon_deg,
            prices: station.prices.clone(),
            air_distance_km: station.air_distance_km,
            route_distance_km: station.route_distance_km,
            route_duration_secs: station.route_duration_secs,
            last_update: station.last_update_age(now).map(humanize_age),
        }
    }
}

/// The ranked-station snapshot.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    /// Whether the live search is running
    pub active: bool,

    /// Selection mode actually used for the current list
    pub used_mode: Option<UsedMode>,

    /// Degraded-mode or failure notice, if any
    pub notice: Option<String>,

    /// When the last fetch cycle completed
    pub last_cycle_at: Option<DateTime<Utc>>,

    /// The ranked stations, best-first
    pub stations: Vec<StationView>,
}

impl StationsResponse {
    /// Build the response from a session snapshot.
    pub fn from_snapshot(snapshot: &SessionSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            active: snapshot.active,
            used_mode: snapshot.used_mode,
            notice: snapshot.notice.clone(),
            last_cycle_at: snapshot.last_cycle_at,
            stations: snapshot
                .stations
                .iter()
                .map(|s| StationView::from_station(s, now))
                .collect(),
        }
    }
}

/// Error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Render an age as a coarse relative label.
pub fn humanize_age(age: chrono::Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 2 {
        return "1 minute ago".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} minutes ago");
    }

    let hours = minutes / 60;
    if hours < 2 {
        return "1 hour ago".to_string();
    }
    if hours < 24 {
        return format!("{hours} hours ago");
    }

    let days = hours / 24;
    if days < 2 {
        return "1 day ago".to_string();
    }
    if days < 7 {
        return format!("{days} days ago");
    }

    let weeks = days / 7;
    if weeks < 2 {
        return "1 week ago".to_string();
    }
    if weeks < 5 {
        return format!("{weeks} weeks ago");
    }

    let months = days / 30;
    if months < 2 {
        return "1 month ago".to_string();
    }
    if months < 12 {
        return format!("{months} months ago");
    }

    let years = days / 365;
    if years < 2 {
        "1 year ago".to_string()
    } else {
        format!("{years} years ago")
    }
}
