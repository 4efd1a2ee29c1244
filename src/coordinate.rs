//! Coordinate pair shared by every component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate only if it passes [`is_valid`].
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        is_valid(lat, lng).then_some(Self { lat, lng })
    }

    pub fn is_valid(&self) -> bool {
        is_valid(self.lat, self.lng)
    }

    /// Tuple form `(lat, lng)`.
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Latitude in [-90, 90], longitude in [-180, 180], both finite.
pub fn is_valid(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}
