//! Nominatim HTTP adapter: reverse geocoding and place search.
//!
//! Nominatim's usage policy asks for an identifying User-Agent and at most
//! one request per second. The client sets the former; callers get the latter
//! by routing reverse lookups through [`crate::geocode_queue::GeocodeQueue`].

use std::time::Duration;

use serde::Deserialize;

use crate::coordinate::LatLng;
use crate::error::{GeocodeError, ProviderError};
use crate::traits::{Place, PlaceSearch, ReverseGeocoder};

/// Street-level detail for reverse lookups.
const REVERSE_ZOOM: u8 = 18;

/// Address shown when the provider answers without anything usable.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "DeliveryRouterApp/1.0".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, at: LatLng) -> Result<String, GeocodeError> {
        let body = self
            .client
            .get(self.endpoint("reverse"))
            .query(&[
                ("format", "json".to_string()),
                ("lat", at.lat.to_string()),
                ("lon", at.lng.to_string()),
                ("zoom", REVERSE_ZOOM.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(ProviderError::from)?
            .json::<ReverseResponse>()
            .await
            .map_err(ProviderError::from)?;

        Ok(format_address(&body))
    }
}

impl PlaceSearch for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<Place>, ProviderError> {
        let hits = self
            .client
            .get(self.endpoint("search"))
            .query(&[("format", "json"), ("limit", "1"), ("q", query)])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())?
            .json::<Vec<SearchHit>>()
            .await?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let lat = parse_degrees(&hit.lat)?;
        let lng = parse_degrees(&hit.lon)?;
        let location = LatLng::checked(lat, lng).ok_or_else(|| {
            ProviderError::InvalidResponse(format!("place outside valid range: {lat}, {lng}"))
        })?;

        Ok(Some(Place {
            location,
            label: hit.display_name,
        }))
    }
}

fn parse_degrees(raw: &str) -> Result<f64, ProviderError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|err| ProviderError::InvalidResponse(format!("bad coordinate {raw:?}: {err}")))
}

/// Builds `"road house_number (suburb)"`.
///
/// Falls back to the neighbourhood when there is no suburb, then to the first
/// segment of the display name, then to [`UNKNOWN_LOCATION`].
pub fn format_address(response: &ReverseResponse) -> String {
    let Some(address) = &response.address else {
        return UNKNOWN_LOCATION.to_string();
    };

    let mut parts: Vec<String> = Vec::new();
    if let Some(road) = non_empty(&address.road) {
        parts.push(road.to_string());
    }
    if let Some(number) = non_empty(&address.house_number) {
        parts.push(number.to_string());
    }
    if let Some(area) = non_empty(&address.suburb).or(non_empty(&address.neighbourhood)) {
        parts.push(format!("({area})"));
    }

    if !parts.is_empty() {
        return parts.join(" ");
    }

    response
        .display_name
        .as_deref()
        .and_then(|name| name.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<AddressParts>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressParts {
    pub road: Option<String>,
    pub house_number: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}
