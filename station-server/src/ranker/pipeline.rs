//! Ranking/selection pipeline.
//!
//! Turns raw upstream candidates plus a location sample into the ranked
//! station list: drop invalid records, compute air distances, select by
//! corridor or radius (with automatic heading fallback), sort by the active
//! criterion, truncate to the result cap.
//!
//! The pipeline is pure: it owns no state and performs no IO. Session
//! state it depends on (the last reliable heading) is passed in explicitly.

use tracing::debug;

use crate::domain::{FuelKind, FuelStation, GeoPoint, LocationSample, StationCandidate};
use crate::geo;

use super::config::{Policy, SearchMode, SortCriterion};
use super::corridor::filter_along_heading;

/// Notice attached to the outcome when directional selection was requested
/// but no usable heading exists.
pub const DIRECTION_UNAVAILABLE_NOTICE: &str =
    "direction unavailable: showing stations in all directions";

/// Which selection mode a pipeline run actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsedMode {
    AlongHeading,
    Omnidirectional,
}

/// Result of resolving the heading for a directional run.
///
/// Derived fresh on every run from the current sample and the remembered
/// bearing; never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingResolution {
    /// The current sample carries a heading within the accuracy threshold.
    Reliable(f64),
    /// The current sample does not, but an earlier sample this session did.
    StaleFallback(f64),
    /// No usable heading has been seen this session.
    Unavailable,
}

/// Resolve the heading to use for a directional run.
pub fn resolve_heading(
    sample: &LocationSample,
    last_good_bearing: Option<f64>,
    policy: &Policy,
) -> HeadingResolution {
    if let Some(heading) = sample.reliable_heading(policy.heading_accuracy_max_deg) {
        return HeadingResolution::Reliable(heading);
    }
    match last_good_bearing {
        Some(bearing) => HeadingResolution::StaleFallback(bearing),
        None => HeadingResolution::Unavailable,
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct RankOutcome {
    /// The ranked stations, best-first, at most `max_results` long.
    pub stations: Vec<FuelStation>,

    /// The selection mode actually used (after any fallback).
    pub used_mode: UsedMode,

    /// Human-readable notice about degraded selection, if any.
    pub notice: Option<String>,
}

/// Run the full selection/ranking pipeline.
pub fn run(
    location: &LocationSample,
    candidates: Vec<StationCandidate>,
    policy: &Policy,
    last_good_bearing: Option<f64>,
) -> RankOutcome {
    let stations = ingest(location.point, candidates, policy);

    let (mut stations, used_mode, notice) = match policy.mode {
        SearchMode::Omnidirectional => {
            (filter_omnidirectional(stations, policy), UsedMode::Omnidirectional, None)
        }
        SearchMode::AlongHeading => match resolve_heading(location, last_good_bearing, policy) {
            HeadingResolution::Reliable(heading) | HeadingResolution::StaleFallback(heading) => (
                filter_along_heading(location.point, heading, stations, policy),
                UsedMode::AlongHeading,
                None,
            ),
            HeadingResolution::Unavailable => (
                filter_omnidirectional(stations, policy),
                UsedMode::Omnidirectional,
                Some(DIRECTION_UNAVAILABLE_NOTICE.to_string()),
            ),
        },
    };

    sort_stations(&mut stations, policy.sort, policy.fuel);
    stations.truncate(policy.max_results);

    RankOutcome {
        stations,
        used_mode,
        notice,
    }
}

/// Convert raw candidates into stations with a fresh air distance,
/// dropping invalid records and anything beyond the search radius.
///
/// The radius cut is defensive: the fetch request already carries the same
/// radius, but the feed is not trusted to honour it exactly.
fn ingest(origin: GeoPoint, candidates: Vec<StationCandidate>, policy: &Policy) -> Vec<FuelStation> {
    let total = candidates.len();
    let mut dropped_invalid = 0usize;
    let mut dropped_far = 0usize;

    let stations: Vec<FuelStation> = candidates
        .iter()
        .filter_map(|candidate| {
            let Ok(mut station) = FuelStation::from_candidate(candidate, policy.fuel) else {
                dropped_invalid += 1;
                return None;
            };

            let air_km = geo::haversine_km(origin, station.point);
            if air_km > policy.search_radius_km {
                dropped_far += 1;
                return None;
            }

            station.air_distance_km = Some(air_km);
            Some(station)
        })
        .collect();

    if dropped_invalid > 0 || dropped_far > 0 {
        debug!(
            total,
            dropped_invalid, dropped_far, "dropped candidates during ingestion"
        );
    }

    stations
}

/// Radius-only selection: nearest-first by air distance, capped.
fn filter_omnidirectional(mut stations: Vec<FuelStation>, policy: &Policy) -> Vec<FuelStation> {
    stations.sort_by(|a, b| {
        a.air_distance_km
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.air_distance_km.unwrap_or(f64::INFINITY))
    });
    stations.truncate(policy.max_results);
    stations
}

/// Sort stations by the active criterion.
///
/// Stable: stations comparing equal keep their current relative order.
/// Missing prices (and missing distances) sort last. Re-applied whenever
/// prices, the location, or route data change.
pub fn sort_stations(stations: &mut [FuelStation], sort: SortCriterion, fuel: FuelKind) {
    match sort {
        SortCriterion::Price => stations.sort_by(|a, b| {
            a.price_for(fuel)
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.price_for(fuel).unwrap_or(f64::INFINITY))
        }),
        SortCriterion::Distance => {
            stations.sort_by(|a, b| a.effective_distance_km().total_cmp(&b.effective_distance_km()))
        }
    }
}

/// Recompute every station's air distance against a new origin and restore
/// the active sort order.
///
/// This is the cheap location-tick path: it never touches route distances,
/// so an earlier routing answer survives any number of refreshes.
pub fn refresh_air_distances(
    stations: &mut Vec<FuelStation>,
    origin: GeoPoint,
    sort: SortCriterion,
    fuel: FuelKind,
) {
    for station in stations.iter_mut() {
        station.air_distance_km = Some(geo::haversine_km(origin, station.point));
    }
    sort_stations(stations, sort, fuel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candidate(lat: f64, lon: f64, price: f64) -> StationCandidate {
        StationCandidate {
            operator: Some(format!("st {lat},{lon},{price}")),
            price: Some(price),
            latitude: Some(lat),
            longitude: Some(lon),
            ..StationCandidate::default()
        }
    }

    fn sample_at(lat: f64, lon: f64) -> LocationSample {
        LocationSample::at(GeoPoint::new(lat, lon), Utc::now())
    }

    fn omni_policy() -> Policy {
        Policy {
            mode: SearchMode::Omnidirectional,
            sort: SortCriterion::Distance,
            ..Policy::default()
        }
    }

    #[test]
    fn drops_invalid_candidates() {
        let location = sample_at(45.0, 9.0);
        let candidates = vec![
            candidate(45.01, 9.0, 1.8),
            StationCandidate::default(), // no coordinates, no price
            StationCandidate {
                latitude: Some(45.02),
                longitude: Some(9.0),
                price: None, // no price
                ..StationCandidate::default()
            },
        ];

        let outcome = run(&location, candidates, &omni_policy(), None);
        assert_eq!(outcome.stations.len(), 1);
    }

    #[test]
    fn drops_candidates_beyond_radius() {
        let location = sample_at(45.0, 9.0);
        let candidates = vec![
            candidate(45.01, 9.0, 1.8),  // ~1.1 km
            candidate(46.0, 9.0, 1.5),   // ~111 km
        ];

        let outcome = run(&location, candidates, &omni_policy(), None);
        assert_eq!(outcome.stations.len(), 1);
        assert!(outcome.stations[0].air_distance_km.unwrap() < 2.0);
    }

    #[test]
    fn every_result_within_radius_and_cap() {
        let location = sample_at(45.0, 9.0);
        let candidates: Vec<_> = (0..40)
            .map(|i| candidate(45.0 + 0.002 * i as f64, 9.0, 1.7 + 0.001 * i as f64))
            .collect();

        let policy = omni_policy();
        let outcome = run(&location, candidates, &policy, None);

        assert!(outcome.stations.len() <= policy.max_results);
        for station in &outcome.stations {
            assert!(station.air_distance_km.unwrap() <= policy.search_radius_km);
        }
    }

    #[test]
    fn omnidirectional_sorts_nearest_first() {
        let location = sample_at(45.0, 9.0);
        let candidates = vec![
            candidate(45.05, 9.0, 1.9),
            candidate(45.01, 9.0, 1.8),
            candidate(45.03, 9.0, 1.7),
        ];

        let outcome = run(&location, candidates, &omni_policy(), None);
        let distances: Vec<f64> = outcome
            .stations
            .iter()
            .map(|s| s.air_distance_km.unwrap())
            .collect();

        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn along_heading_uses_reliable_heading() {
        let location = sample_at(45.0, 9.0).with_heading(0.0, 10.0);
        let candidates = vec![
            candidate(45.05, 9.0, 1.8),  // ahead
            candidate(44.95, 9.0, 1.5),  // behind
        ];

        let policy = Policy {
            sort: SortCriterion::Distance,
            ..Policy::default()
        };
        let outcome = run(&location, candidates, &policy, None);

        assert_eq!(outcome.used_mode, UsedMode::AlongHeading);
        assert!(outcome.notice.is_none());
        assert_eq!(outcome.stations.len(), 1);
        assert!(outcome.stations[0].point.lat_deg > 45.0);
    }

    #[test]
    fn along_heading_falls_back_to_remembered_bearing() {
        // Sample without a trustworthy heading, but a bearing remembered
        // from earlier in the session.
        let location = sample_at(45.0, 9.0).with_heading(0.0, 90.0);
        let candidates = vec![candidate(45.05, 9.0, 1.8), candidate(44.95, 9.0, 1.5)];

        let outcome = run(&location, candidates, &Policy::default(), Some(0.0));

        assert_eq!(outcome.used_mode, UsedMode::AlongHeading);
        assert!(outcome.notice.is_none());
        assert_eq!(outcome.stations.len(), 1);
    }

    #[test]
    fn no_heading_degrades_to_omnidirectional_with_notice() {
        let location = sample_at(45.0, 9.0);
        let candidates = vec![candidate(45.05, 9.0, 1.8), candidate(44.95, 9.0, 1.5)];

        let outcome = run(&location, candidates, &Policy::default(), None);

        assert_eq!(outcome.used_mode, UsedMode::Omnidirectional);
        assert_eq!(outcome.notice.as_deref(), Some(DIRECTION_UNAVAILABLE_NOTICE));
        // Both stations survive: selection is not empty merely because the
        // heading is missing.
        assert_eq!(outcome.stations.len(), 2);
    }

    #[test]
    fn corridor_example() {
        // Origin (45.0, 9.0), heading north, corridor 3 km, cone 70 deg,
        // radius 10 km.
        let location = sample_at(45.0, 9.0).with_heading(0.0, 10.0);
        let candidates = vec![
            candidate(45.05, 9.0, 1.8),  // ~5.5 km due north: included
            candidate(44.95, 9.0, 1.5),  // due south: excluded (behind)
            candidate(45.03, 9.10, 1.4), // north-east: excluded (lateral)
        ];

        let outcome = run(&location, candidates, &Policy::default(), None);

        assert_eq!(outcome.stations.len(), 1);
        assert_eq!(outcome.stations[0].point, GeoPoint::new(45.05, 9.0));
    }

    #[test]
    fn price_sort_puts_missing_prices_last() {
        let location = sample_at(45.0, 9.0);
        let policy = Policy {
            mode: SearchMode::Omnidirectional,
            sort: SortCriterion::Price,
            ..Policy::default()
        };

        let outcome = run(
            &location,
            vec![
                candidate(45.01, 9.0, 1.9),
                candidate(45.02, 9.0, 1.7),
                candidate(45.03, 9.0, 1.8),
            ],
            &policy,
            None,
        );

        let prices: Vec<_> = outcome
            .stations
            .iter()
            .map(|s| s.price_for(policy.fuel).unwrap())
            .collect();
        assert_eq!(prices, vec![1.7, 1.8, 1.9]);

        // A station losing its price entry sorts last after a re-sort.
        let mut stations = outcome.stations;
        stations[0].prices.clear();
        let cheapest_id = stations[0].id.clone();
        sort_stations(&mut stations, SortCriterion::Price, policy.fuel);
        assert_eq!(stations.last().unwrap().id, cheapest_id);
    }

    #[test]
    fn equal_prices_keep_input_order() {
        let location = sample_at(45.0, 9.0);
        let policy = Policy {
            mode: SearchMode::Omnidirectional,
            sort: SortCriterion::Price,
            ..Policy::default()
        };

        // All at the same price; omnidirectional pre-sort orders them by
        // distance, and the stable price sort must not disturb that.
        let outcome = run(
            &location,
            vec![
                candidate(45.01, 9.0, 1.8),
                candidate(45.02, 9.0, 1.8),
                candidate(45.03, 9.0, 1.8),
            ],
            &policy,
            None,
        );

        let lats: Vec<_> = outcome.stations.iter().map(|s| s.point.lat_deg).collect();
        assert_eq!(lats, vec![45.01, 45.02, 45.03]);
    }

    #[test]
    fn distance_sort_prefers_route_distance() {
        let location = sample_at(45.0, 9.0);
        let candidates = vec![candidate(45.01, 9.0, 1.8), candidate(45.02, 9.0, 1.7)];

        let policy = Policy {
            mode: SearchMode::Omnidirectional,
            sort: SortCriterion::Distance,
            ..Policy::default()
        };
        let mut stations = run(&location, candidates, &policy, None).stations;

        // The nearer station by air is much farther by road.
        stations[0].route_distance_km = Some(12.4);
        sort_stations(&mut stations, SortCriterion::Distance, policy.fuel);

        assert_eq!(stations[0].point.lat_deg, 45.02);
        assert_eq!(stations[1].route_distance_km, Some(12.4));
    }

    #[test]
    fn pipeline_is_idempotent() {
        let location = sample_at(45.0, 9.0).with_heading(10.0, 5.0);
        let candidates: Vec<_> = (0..20)
            .map(|i| candidate(45.0 + 0.004 * i as f64, 9.0 + 0.001 * i as f64, 1.9 - 0.002 * i as f64))
            .collect();

        let first = run(&location, candidates.clone(), &Policy::default(), None);
        let second = run(&location, candidates, &Policy::default(), None);

        assert_eq!(first.stations, second.stations);
        assert_eq!(first.used_mode, second.used_mode);
        assert_eq!(first.notice, second.notice);
    }

    #[test]
    fn refresh_air_distances_preserves_route_data() {
        let location = sample_at(45.0, 9.0);
        let policy = omni_policy();
        let mut stations = run(
            &location,
            vec![candidate(45.01, 9.0, 1.8)],
            &policy,
            None,
        )
        .stations;

        stations[0].route_distance_km = Some(3.3);
        let old_air = stations[0].air_distance_km.unwrap();

        // The user moved; air distance changes, route distance must not.
        refresh_air_distances(
            &mut stations,
            GeoPoint::new(45.005, 9.0),
            SortCriterion::Distance,
            policy.fuel,
        );

        assert!(stations[0].air_distance_km.unwrap() < old_air);
        assert_eq!(stations[0].route_distance_km, Some(3.3));
    }

    #[test]
    fn heading_resolution_states() {
        let policy = Policy::default();

        let reliable = sample_at(45.0, 9.0).with_heading(120.0, 10.0);
        assert_eq!(
            resolve_heading(&reliable, None, &policy),
            HeadingResolution::Reliable(120.0)
        );

        let inaccurate = sample_at(45.0, 9.0).with_heading(120.0, 80.0);
        assert_eq!(
            resolve_heading(&inaccurate, Some(45.0), &policy),
            HeadingResolution::StaleFallback(45.0)
        );
        assert_eq!(
            resolve_heading(&inaccurate, None, &policy),
            HeadingResolution::Unavailable
        );
    }
}
