//! Real Caracas locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap, rounded to five decimals.

use courier_route::coordinate::LatLng;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

// ============================================================================
// Kitchens (pickup points)
// ============================================================================

pub const LOS_PALOS_GRANDES_KITCHEN: Location =
    Location::new("Los Palos Grandes kitchen", 10.50050, -66.84240);

pub const CANDELARIA_KITCHEN: Location = Location::new("La Candelaria kitchen", 10.50530, -66.90200);

// ============================================================================
// Drop-off points
// ============================================================================

pub const DROP_OFFS: &[Location] = &[
    Location::new("Plaza Altamira", 10.49640, -66.84900),
    Location::new("Chacao market", 10.49670, -66.85390),
    Location::new("Las Mercedes", 10.48120, -66.85960),
    Location::new("Sabana Grande", 10.49190, -66.87300),
    Location::new("Plaza Bolivar", 10.50610, -66.91460),
    Location::new("El Hatillo", 10.42450, -66.82520),
];
