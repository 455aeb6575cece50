//! Directional corridor filter.
//!
//! Approximates "along the way" without road data. A candidate survives
//! when it lies ahead of the user (forward projection above the minimum),
//! inside a lateral corridor around the heading, and inside a forward
//! bearing cone. This is a soft geometric test, not a road-graph test.

use crate::domain::{FuelStation, GeoPoint};
use crate::geo;

use super::config::Policy;

/// Filter `stations` to those ahead of `origin` along `heading_deg`.
///
/// Survivors are ordered nearest-first by forward projection and truncated
/// to the result cap. The final sort criterion (price or distance) is
/// applied afterwards by the pipeline.
pub fn filter_along_heading(
    origin: GeoPoint,
    heading_deg: f64,
    stations: Vec<FuelStation>,
    policy: &Policy,
) -> Vec<FuelStation> {
    let dir = geo::bearing_to_unit_vector(heading_deg);

    let mut kept: Vec<(f64, FuelStation)> = Vec::with_capacity(stations.len());
    for station in stations {
        let forward = geo::forward_km(origin, station.point, dir);
        if forward <= policy.min_forward_km || forward > policy.search_radius_km {
            continue;
        }

        if geo::cross_track_km(origin, station.point, dir) > policy.corridor_half_width_km {
            continue;
        }

        let angle = geo::angular_difference_deg(
            geo::bearing_to_point_deg(origin, station.point),
            heading_deg,
        );
        if angle > policy.forward_cone_half_angle_deg {
            continue;
        }

        kept.push((forward, station));
    }

    kept.sort_by(|a, b| a.0.total_cmp(&b.0));
    kept.truncate(policy.max_results);
    kept.into_iter().map(|(_, station)| station).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FuelKind, StationCandidate};

    fn station_at(lat: f64, lon: f64) -> FuelStation {
        let candidate = StationCandidate {
            operator: Some(format!("station {lat},{lon}")),
            price: Some(1.8),
            latitude: Some(lat),
            longitude: Some(lon),
            ..StationCandidate::default()
        };
        FuelStation::from_candidate(&candidate, FuelKind::Diesel).unwrap()
    }

    fn policy() -> Policy {
        Policy {
            search_radius_km: 10.0,
            corridor_half_width_km: 3.0,
            forward_cone_half_angle_deg: 70.0,
            min_forward_km: 0.5,
            ..Policy::default()
        }
    }

    #[test]
    fn keeps_station_ahead_in_corridor() {
        // ~5.5 km due north of the origin, heading north.
        let origin = GeoPoint::new(45.0, 9.0);
        let kept = filter_along_heading(origin, 0.0, vec![station_at(45.05, 9.0)], &policy());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn rejects_station_behind() {
        let origin = GeoPoint::new(45.0, 9.0);
        let kept = filter_along_heading(origin, 0.0, vec![station_at(44.95, 9.0)], &policy());
        assert!(kept.is_empty());
    }

    #[test]
    fn rejects_station_outside_corridor() {
        // North-east of the origin: within radius but ~7.9 km lateral.
        let origin = GeoPoint::new(45.0, 9.0);
        let kept = filter_along_heading(origin, 0.0, vec![station_at(45.03, 9.10)], &policy());
        assert!(kept.is_empty());
    }

    #[test]
    fn rejects_station_at_the_user() {
        // ~0.1 km ahead: below the minimum forward projection.
        let origin = GeoPoint::new(45.0, 9.0);
        let kept = filter_along_heading(origin, 0.0, vec![station_at(45.001, 9.0)], &policy());
        assert!(kept.is_empty());
    }

    #[test]
    fn rejects_station_beyond_radius() {
        // ~16.7 km due north: on-axis but past the look-ahead radius.
        let origin = GeoPoint::new(45.0, 9.0);
        let kept = filter_along_heading(origin, 0.0, vec![station_at(45.15, 9.0)], &policy());
        assert!(kept.is_empty());
    }

    #[test]
    fn heading_is_respected() {
        // The same station that fails going north passes going east.
        let origin = GeoPoint::new(45.0, 9.0);
        let east_station = station_at(45.0, 9.07);

        assert!(filter_along_heading(origin, 0.0, vec![east_station.clone()], &policy()).is_empty());
        assert_eq!(
            filter_along_heading(origin, 90.0, vec![east_station], &policy()).len(),
            1
        );
    }

    #[test]
    fn survivors_sorted_by_forward_distance() {
        let origin = GeoPoint::new(45.0, 9.0);
        let far = station_at(45.08, 9.0);
        let near = station_at(45.02, 9.0);
        let mid = station_at(45.05, 9.0);

        let kept = filter_along_heading(origin, 0.0, vec![far, near, mid], &policy());
        let names: Vec<_> = kept.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["station 45.02,9", "station 45.05,9", "station 45.08,9"]);
    }

    #[test]
    fn truncates_to_result_cap() {
        let origin = GeoPoint::new(45.0, 9.0);
        let stations: Vec<_> = (1..=8).map(|i| station_at(45.0 + 0.01 * i as f64, 9.0)).collect();

        let mut policy = policy();
        policy.max_results = 3;

        let kept = filter_along_heading(origin, 0.0, stations, &policy);
        assert_eq!(kept.len(), 3);
        // The nearest three survive, nearest first.
        assert!(kept.windows(2).all(|w| w[0].point.lat_deg < w[1].point.lat_deg));
        assert!(kept[2].point.lat_deg < 45.035);
    }
}
