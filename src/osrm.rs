//! OSRM HTTP adapter for driving routes.

use std::time::Duration;

use serde::Deserialize;

use crate::coordinate::LatLng;
use crate::error::{ProviderError, RouteFailure};
use crate::polyline::{DEFAULT_PRECISION, Polyline};
use crate::route::RouteResult;
use crate::traits::RouteProvider;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// `/route/v1/{profile}/{lng,lat;...}` with full polyline geometry.
    pub fn route_url(&self, waypoints: &[LatLng]) -> String {
        let coords = waypoints
            .iter()
            .map(|point| format!("{:.6},{:.6}", point.lng, point.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=polyline",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }
}

impl RouteProvider for OsrmClient {
    async fn fetch_route(&self, waypoints: &[LatLng]) -> Result<RouteResult, RouteFailure> {
        if waypoints.len() < 2 {
            return Err(RouteFailure::TooFewWaypoints(waypoints.len()));
        }

        let response = self
            .client
            .get(self.route_url(waypoints))
            .send()
            .await
            .map_err(ProviderError::from)?;

        // OSRM reports NoRoute and friends with a 400 and a JSON body, so read
        // the body before judging the status.
        let status = response.status();
        let body = match response.json::<OsrmRouteResponse>().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ProviderError::Status {
                    status: status.as_u16(),
                }
                .into());
            }
            Err(err) => return Err(ProviderError::from(err).into()),
        };

        if body.code != "Ok" {
            return Err(RouteFailure::NoRoute(body.code));
        }

        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RouteFailure::NoRoute("empty routes".to_string()))?;

        let path = Polyline::decode(&route.geometry, DEFAULT_PRECISION)?;

        Ok(RouteResult {
            distance_m: route.distance,
            duration_s: route.duration,
            path,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    #[serde(default)]
    geometry: String,
}
