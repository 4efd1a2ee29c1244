//! Error taxonomy.
//!
//! Only [`ParseFailure`], [`StoreError`], [`PlanError`] and [`ConfigError`]
//! reach callers. Geocoding and routing failures are recovered at their
//! boundary (placeholder address, `None` route) and only logged.

use thiserror::Error;

use crate::polyline::PolylineError;
use crate::store::DeliveryId;

/// Failure talking to an external HTTP collaborator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status}")]
    Status { status: u16 },

    #[error("unusable response: {0}")]
    InvalidResponse(String),
}

/// Location text could not be turned into a coordinate pair.
///
/// Every variant keeps the raw input so the caller can offer it for retry.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("no location given")]
    Empty,

    #[error("coordinates out of range: {lat}, {lng}")]
    OutOfRange { input: String, lat: f64, lng: f64 },

    #[error("unrecognized location format: {input}")]
    Unrecognized { input: String },

    #[error("no coordinates found behind link {input}")]
    LinkUnresolved { input: String },

    #[error("could not fetch link {input}: {source}")]
    LinkFetch {
        input: String,
        #[source]
        source: ProviderError,
    },

    #[error("no place found for {input:?}")]
    NoPlaceFound { input: String },

    #[error("place search failed for {input:?}: {source}")]
    PlaceSearch {
        input: String,
        #[source]
        source: ProviderError,
    },
}

impl ParseFailure {
    /// The text the user submitted.
    pub fn input(&self) -> &str {
        match self {
            ParseFailure::Empty => "",
            ParseFailure::OutOfRange { input, .. }
            | ParseFailure::Unrecognized { input }
            | ParseFailure::LinkUnresolved { input }
            | ParseFailure::LinkFetch { input, .. }
            | ParseFailure::NoPlaceFound { input }
            | ParseFailure::PlaceSearch { input, .. } => input,
        }
    }

    /// Corrective message to show next to the preserved input.
    pub fn hint(&self) -> &'static str {
        match self {
            ParseFailure::Empty => "Enter coordinates, a map link or a place name.",
            ParseFailure::OutOfRange { .. } => {
                "Latitude must be between -90 and 90 and longitude between -180 and 180."
            }
            ParseFailure::Unrecognized { .. } => {
                "Format not recognized. Try \"lat, lng\" or a valid map link."
            }
            ParseFailure::LinkUnresolved { .. } => {
                "Could not extract coordinates. Try the full map link instead of the short one."
            }
            ParseFailure::LinkFetch { .. } => {
                "Error processing the link. Check your connection and try again."
            }
            ParseFailure::NoPlaceFound { .. } => {
                "No place matched. Try a more specific query or paste coordinates."
            }
            ParseFailure::PlaceSearch { .. } => {
                "Place search is unavailable. Check your connection or paste coordinates."
            }
        }
    }
}

/// Reverse geocoding failed. Recovered as a placeholder address.
#[derive(Debug, Error)]
#[error("reverse geocoding failed: {0}")]
pub struct GeocodeError(#[from] pub ProviderError);

/// Routing service produced no usable route. Recovered as `None`.
#[derive(Debug, Error)]
pub enum RouteFailure {
    #[error("at least two waypoints are required, got {0}")]
    TooFewWaypoints(usize),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("routing service returned no route (code {0})")]
    NoRoute(String),

    #[error("route geometry could not be decoded: {0}")]
    Geometry(#[from] PolylineError),
}

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("unknown delivery {0}")]
    UnknownDelivery(DeliveryId),

    #[error("coordinates out of range: {lat}, {lng}")]
    InvalidLocation { lat: f64, lng: f64 },

    #[error("{field} must be a finite amount >= 0, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("new pending order must list every pending delivery exactly once")]
    InvalidOrder,
}

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("set a pickup point before adding deliveries")]
    NoPickup,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_is_preserved() {
        let failure = ParseFailure::LinkUnresolved {
            input: "https://maps.app.goo.gl/abc".to_string(),
        };
        assert_eq!(failure.input(), "https://maps.app.goo.gl/abc");
        assert!(failure.hint().contains("full map link"));
    }

    #[test]
    fn test_out_of_range_message() {
        let failure = ParseFailure::OutOfRange {
            input: "200, 50".to_string(),
            lat: 200.0,
            lng: 50.0,
        };
        assert_eq!(failure.to_string(), "coordinates out of range: 200, 50");
        assert_eq!(failure.input(), "200, 50");
    }
}
