//! courier-route core
//!
//! Planning logic for a single courier's multi-stop run from one pickup
//! point: location resolution, visit sequencing, tier pricing, and driving
//! routes with their encoded geometry.

pub mod config;
pub mod coordinate;
pub mod error;
pub mod geocode_queue;
pub mod haversine;
pub mod link_proxy;
pub mod nominatim;
pub mod osrm;
pub mod planner;
pub mod polyline;
pub mod pricing;
pub mod resolver;
pub mod route;
pub mod sequencer;
pub mod store;
pub mod traits;
