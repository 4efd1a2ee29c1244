//! Great-circle distance between coordinates.
//!
//! Used for pricing tiers, nearest-neighbor sequencing and the straight-line
//! distance labels shown next to each delivery.

use crate::coordinate::LatLng;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters.
///
/// Non-negative and symmetric; zero for identical points.
pub fn distance_m(from: LatLng, to: LatLng) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Haversine distance in kilometers.
pub fn distance_km(from: LatLng, to: LatLng) -> f64 {
    distance_m(from, to) / 1000.0
}
