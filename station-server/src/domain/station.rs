//! Ranked fuel station entity.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DomainError, FuelKind, GeoPoint, StationCandidate};

/// Format of the upstream free-text `last_update` stamp.
const LAST_UPDATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Identifier for a station within one fetch cycle.
///
/// Derived from the upstream rank and the coordinates. Uniqueness is
/// best-effort: the feed exposes no stable station ids, and ids are not
/// comparable across fetch cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationId(String);

impl StationId {
    /// Derive an id from the upstream rank and coordinates.
    pub fn derive(rank: i32, point: GeoPoint) -> Self {
        Self(format!("{}_{}_{}", rank, point.lat_deg, point.lon_deg))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fuel station as selected and ranked for display.
///
/// Created fresh on every fetch cycle. The distance fields are filled in
/// progressively: air distance at ingestion and again on every location
/// tick, route distance whenever the routing collaborator answers. A set
/// route distance is never cleared by an air-distance refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStation {
    pub id: StationId,
    pub name: String,
    pub address: String,
    pub point: GeoPoint,

    /// Price per fuel kind, EUR per litre. One entry per fetched kind.
    pub prices: BTreeMap<FuelKind, f64>,

    /// Great-circle distance from the user, km.
    pub air_distance_km: Option<f64>,

    /// Road distance from the routing collaborator, km.
    pub route_distance_km: Option<f64>,

    /// Road travel time from the routing collaborator, seconds.
    pub route_duration_secs: Option<u32>,

    /// Upstream free-text "last updated" stamp.
    pub last_update: Option<String>,
}

impl FuelStation {
    /// Build a station from a raw candidate record.
    ///
    /// Fails if the record is missing coordinates or a price; the pipeline
    /// drops such records without failing the batch.
    pub fn from_candidate(
        candidate: &StationCandidate,
        fuel: FuelKind,
    ) -> Result<Self, DomainError> {
        let lat = candidate
            .latitude
            .ok_or(DomainError::MissingField("latitude"))?;
        let lon = candidate
            .longitude
            .ok_or(DomainError::MissingField("longitude"))?;
        let price = candidate.price.ok_or(DomainError::MissingField("price"))?;

        let point = GeoPoint::new(lat, lon);

        Ok(Self {
            id: StationId::derive(candidate.rank.unwrap_or(0), point),
            name: candidate
                .operator
                .clone()
                .unwrap_or_else(|| "Unknown operator".to_string()),
            address: candidate
                .address
                .clone()
                .unwrap_or_else(|| "Address unavailable".to_string()),
            point,
            prices: BTreeMap::from([(fuel, price)]),
            air_distance_km: None,
            route_distance_km: None,
            route_duration_secs: None,
            last_update: candidate.last_update.clone(),
        })
    }

    /// Price for the given fuel kind, if known.
    pub fn price_for(&self, fuel: FuelKind) -> Option<f64> {
        self.prices.get(&fuel).copied()
    }

    /// Distance used for sorting and display: road distance when the routing
    /// collaborator has answered, air distance otherwise. Stations with
    /// neither sort last.
    pub fn effective_distance_km(&self) -> f64 {
        self.route_distance_km
            .or(self.air_distance_km)
            .unwrap_or(f64::INFINITY)
    }

    /// Age of the upstream price stamp relative to `now`.
    ///
    /// Returns `None` when the stamp is missing, unparseable, or in the
    /// future. The stamp carries no zone offset; it is read as UTC.
    pub fn last_update_age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let stamp = self.last_update.as_deref()?;
        let parsed = NaiveDateTime::parse_from_str(stamp, LAST_UPDATE_FORMAT).ok()?;
        let age = now.signed_duration_since(parsed.and_utc());
        (age >= chrono::Duration::zero()).then_some(age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate() -> StationCandidate {
        StationCandidate {
            operator: Some("Esso".to_string()),
            address: Some("Via Emilia 10".to_string()),
            price: Some(1.85),
            latitude: Some(45.0),
            longitude: Some(9.0),
            last_update: Some("01/08/2026 07:30:00".to_string()),
            rank: Some(3),
        }
    }

    #[test]
    fn from_candidate_builds_station() {
        let station = FuelStation::from_candidate(&candidate(), FuelKind::Diesel).unwrap();

        assert_eq!(station.name, "Esso");
        assert_eq!(station.address, "Via Emilia 10");
        assert_eq!(station.point, GeoPoint::new(45.0, 9.0));
        assert_eq!(station.price_for(FuelKind::Diesel), Some(1.85));
        assert_eq!(station.price_for(FuelKind::Petrol), None);
        assert_eq!(station.id.as_str(), "3_45_9");
        assert!(station.air_distance_km.is_none());
        assert!(station.route_distance_km.is_none());
    }

    #[test]
    fn from_candidate_rejects_missing_required_fields() {
        let mut c = candidate();
        c.latitude = None;
        assert_eq!(
            FuelStation::from_candidate(&c, FuelKind::Diesel),
            Err(DomainError::MissingField("latitude"))
        );

        let mut c = candidate();
        c.longitude = None;
        assert_eq!(
            FuelStation::from_candidate(&c, FuelKind::Diesel),
            Err(DomainError::MissingField("longitude"))
        );

        let mut c = candidate();
        c.price = None;
        assert_eq!(
            FuelStation::from_candidate(&c, FuelKind::Diesel),
            Err(DomainError::MissingField("price"))
        );
    }

    #[test]
    fn from_candidate_fills_name_and_address_defaults() {
        let mut c = candidate();
        c.operator = None;
        c.address = None;
        c.rank = None;

        let station = FuelStation::from_candidate(&c, FuelKind::Diesel).unwrap();
        assert_eq!(station.name, "Unknown operator");
        assert_eq!(station.address, "Address unavailable");
        assert_eq!(station.id.as_str(), "0_45_9");
    }

    #[test]
    fn effective_distance_prefers_route() {
        let mut station = FuelStation::from_candidate(&candidate(), FuelKind::Diesel).unwrap();

        assert_eq!(station.effective_distance_km(), f64::INFINITY);

        station.air_distance_km = Some(10.1);
        assert_eq!(station.effective_distance_km(), 10.1);

        station.route_distance_km = Some(12.4);
        assert_eq!(station.effective_distance_km(), 12.4);
    }

    #[test]
    fn last_update_age_parses_stamp() {
        let station = FuelStation::from_candidate(&candidate(), FuelKind::Diesel).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();

        let age = station.last_update_age(now).unwrap();
        assert_eq!(age, chrono::Duration::hours(2));
    }

    #[test]
    fn last_update_age_rejects_garbage_and_future_stamps() {
        let mut station = FuelStation::from_candidate(&candidate(), FuelKind::Diesel).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();

        station.last_update = Some("yesterday-ish".to_string());
        assert!(station.last_update_age(now).is_none());

        station.last_update = Some("01/08/2027 00:00:00".to_string());
        assert!(station.last_update_age(now).is_none());

        station.last_update = None;
        assert!(station.last_update_age(now).is_none());
    }
}
