//! Visit-order sequencing (greedy nearest neighbor).
//!
//! Only runs when the courier asks for it. Manual reordering is a plain store
//! operation and is never second-guessed here.

use crate::coordinate::LatLng;
use crate::haversine;
use crate::traits::Stop;

/// Orders stops by repeatedly visiting the closest unvisited pending stop,
/// starting from `start`.
///
/// Completed stops follow the pending ones in their original relative order.
/// On equal distances the stop met first in `stops` wins. O(n²) in the number
/// of pending stops, which is fine for a single courier's daily load. The
/// result is a local heuristic, not an optimal tour.
pub fn nearest_neighbor<S>(start: LatLng, stops: &[S]) -> Vec<S::Id>
where
    S: Stop,
{
    nearest_neighbor_by(start, stops, haversine::distance_m)
}

/// [`nearest_neighbor`] with a caller-supplied metric.
pub fn nearest_neighbor_by<S, F>(start: LatLng, stops: &[S], distance: F) -> Vec<S::Id>
where
    S: Stop,
    F: Fn(LatLng, LatLng) -> f64,
{
    let (mut remaining, completed): (Vec<&S>, Vec<&S>) =
        stops.iter().partition(|stop| stop.is_pending());

    let mut order = Vec::with_capacity(stops.len());
    let mut current = start;

    while !remaining.is_empty() {
        let mut nearest_idx = 0;
        let mut min_dist = f64::INFINITY;

        for (idx, stop) in remaining.iter().enumerate() {
            let d = distance(current, stop.location());
            // strict: first encountered keeps ties
            if d < min_dist {
                min_dist = d;
                nearest_idx = idx;
            }
        }

        // `remove`, not `swap_remove`: tie-breaking depends on working-list order.
        let next = remaining.remove(nearest_idx);
        current = next.location();
        order.push(next.id().clone());
    }

    order.extend(completed.into_iter().map(|stop| stop.id().clone()));
    order
}

/// Sum of leg distances along `order`, starting from `start`.
pub fn path_length_m(start: LatLng, order: &[LatLng]) -> f64 {
    let mut total = 0.0;
    let mut current = start;
    for point in order {
        total += haversine::distance_m(current, *point);
        current = *point;
    }
    total
}
