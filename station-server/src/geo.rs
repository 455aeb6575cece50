//! Geodesy primitives.
//!
//! Pure functions over [`GeoPoint`]s: great-circle distance, a local
//! east/north planar projection, and bearing arithmetic.
//!
//! The planar projection is equirectangular and only valid within short
//! range of the origin (tens of kilometres, error growing with distance).
//! That covers every corridor width this crate uses; it is not suitable
//! for continental or antipodal geometry.

use crate::domain::GeoPoint;

/// Earth's mean radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres.
///
/// Spherical law of haversines. Symmetric, non-negative, and zero for
/// identical points up to float precision.
///
/// # Example
///
/// ```
/// use station_server::domain::GeoPoint;
/// use station_server::geo::haversine_km;
///
/// let milan = GeoPoint::new(45.4642, 9.1900);
/// let rome = GeoPoint::new(41.9028, 12.4964);
/// let d = haversine_km(milan, rome);
/// assert!((d - 477.0).abs() < 5.0);
/// ```
#[inline]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat_deg - a.lat_deg).to_radians();
    let d_lon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat_deg.to_radians().cos() * b.lat_deg.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Unit vector `(east, north)` for a compass bearing.
///
/// 0 degrees points north, 90 east.
#[inline]
pub fn bearing_to_unit_vector(bearing_deg: f64) -> (f64, f64) {
    let rad = bearing_deg.to_radians();
    (rad.sin(), rad.cos())
}

/// Project `p` into a local `(east, north)` plane centred on `origin`, km.
///
/// Equirectangular approximation: north = Δlat·R, east = Δlon·R·cos(lat₀).
#[inline]
pub fn to_local_plane_km(origin: GeoPoint, p: GeoPoint) -> (f64, f64) {
    let lat0 = origin.lat_deg.to_radians();
    let d_lat = (p.lat_deg - origin.lat_deg).to_radians();
    let d_lon = (p.lon_deg - origin.lon_deg).to_radians();

    let north_km = d_lat * EARTH_RADIUS_KM;
    let east_km = d_lon * EARTH_RADIUS_KM * lat0.cos();
    (east_km, north_km)
}

/// Forward component of `p` relative to `origin` along a heading unit
/// vector, km. Negative values lie behind the origin.
#[inline]
pub fn forward_km(origin: GeoPoint, p: GeoPoint, dir_unit: (f64, f64)) -> f64 {
    let (east, north) = to_local_plane_km(origin, p);
    east * dir_unit.0 + north * dir_unit.1
}

/// Magnitude of the cross-track (lateral) component of `p` relative to a
/// heading through `origin`, km.
#[inline]
pub fn cross_track_km(origin: GeoPoint, p: GeoPoint, dir_unit: (f64, f64)) -> f64 {
    let (east, north) = to_local_plane_km(origin, p);
    (east * -dir_unit.1 + north * dir_unit.0).abs()
}

/// Compass bearing from `origin` to `p`, degrees in `[0, 360)`.
#[inline]
pub fn bearing_to_point_deg(origin: GeoPoint, p: GeoPoint) -> f64 {
    let (east, north) = to_local_plane_km(origin, p);
    east.atan2(north).to_degrees().rem_euclid(360.0)
}

/// Absolute angular difference between two bearings, degrees in `[0, 180]`.
#[inline]
pub fn angular_difference_deg(a_deg: f64, b_deg: f64) -> f64 {
    let mut diff = (a_deg - b_deg) % 360.0;
    if diff > 180.0 {
        diff -= 360.0;
    }
    if diff < -180.0 {
        diff += 360.0;
    }
    diff.abs()
}
