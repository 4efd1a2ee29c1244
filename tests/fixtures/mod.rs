//! Test fixtures for courier-route.
//!
//! Provides realistic test data:
//! - Real Caracas locations (from OpenStreetMap)
//! - In-process stand-ins for the OSRM, Nominatim and link-proxy HTTP APIs

#![allow(dead_code)]

pub mod caracas_locations;
pub mod mock_services;

pub use caracas_locations::*;
