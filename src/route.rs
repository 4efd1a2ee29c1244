//! Driving route for the current visit order.

use serde::{Deserialize, Serialize};

use crate::coordinate::LatLng;
use crate::error::RouteFailure;
use crate::polyline::Polyline;
use crate::traits::RouteProvider;

/// Totals and decoded geometry for a route. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub distance_m: f64,
    pub duration_s: f64,
    pub path: Polyline,
}

impl RouteResult {
    pub fn distance_label(&self) -> String {
        format_distance(self.distance_m)
    }

    pub fn duration_label(&self) -> String {
        format_duration(self.duration_s)
    }
}

/// Pickup first, then the pending stops in visit order.
pub fn waypoints(pickup: LatLng, ordered_stops: &[LatLng]) -> Vec<LatLng> {
    let mut points = Vec::with_capacity(ordered_stops.len() + 1);
    points.push(pickup);
    points.extend_from_slice(ordered_stops);
    points
}

/// Asks `provider` for a route from `pickup` through `ordered_stops`.
///
/// Any failure is logged and reported as `None`: callers treat it as
/// "no route available" and clear whatever they were showing.
pub async fn compute_route<P>(
    provider: &P,
    pickup: LatLng,
    ordered_stops: &[LatLng],
) -> Option<RouteResult>
where
    P: RouteProvider,
{
    let points = waypoints(pickup, ordered_stops);
    if points.len() < 2 {
        tracing::debug!("route skipped, no pending stops");
        return None;
    }

    match provider.fetch_route(&points).await {
        Ok(route) => {
            tracing::debug!(
                waypoints = points.len(),
                distance_m = route.distance_m,
                duration_s = route.duration_s,
                "route computed"
            );
            Some(route)
        }
        Err(err) => {
            tracing::warn!(waypoints = points.len(), error = %err, "route unavailable");
            None
        }
    }
}

/// `"12.34 km"`.
pub fn format_distance(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}

/// Whole minutes, rounded down: `"14 min"`.
pub fn format_duration(seconds: f64) -> String {
    format!("{} min", (seconds / 60.0).floor() as i64)
}
