//! HTTP adapters against local mock servers.

mod fixtures;

use axum::http::StatusCode;
use serde_json::json;

use courier_route::coordinate::LatLng;
use courier_route::error::{ProviderError, RouteFailure};
use courier_route::link_proxy::{LinkProxyClient, LinkProxyConfig};
use courier_route::nominatim::{NominatimClient, NominatimConfig};
use courier_route::osrm::{OsrmClient, OsrmConfig};
use courier_route::route::compute_route;
use courier_route::traits::{LinkUnwrapper, PlaceSearch, ReverseGeocoder, RouteProvider};

use fixtures::mock_services;

const GOOGLE_EXAMPLE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

fn osrm_client(base_url: String) -> OsrmClient {
    OsrmClient::new(OsrmConfig {
        base_url,
        profile: "driving".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn nominatim_client(base_url: String) -> NominatimClient {
    NominatimClient::new(NominatimConfig {
        base_url,
        user_agent: "courier-route-tests".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn two_stops() -> [LatLng; 2] {
    [LatLng::new(10.5005, -66.8424), LatLng::new(10.4962, -66.8467)]
}

// ============================================================================
// OSRM
// ============================================================================

#[tokio::test]
async fn osrm_route_is_decoded() {
    let (base, recorder) = mock_services::osrm(
        StatusCode::OK,
        json!({
            "code": "Ok",
            "routes": [{ "distance": 12340.0, "duration": 845.0, "geometry": GOOGLE_EXAMPLE }]
        }),
    )
    .await;

    let route = osrm_client(base).fetch_route(&two_stops()).await.unwrap();
    assert_eq!(route.distance_m, 12340.0);
    assert_eq!(route.distance_label(), "12.34 km");
    assert_eq!(route.duration_label(), "14 min");
    assert_eq!(
        route.path.points(),
        &[
            LatLng::new(38.5, -120.2),
            LatLng::new(40.7, -120.95),
            LatLng::new(43.252, -126.453),
        ]
    );

    assert_eq!(
        recorder.entries(),
        vec![
            "driving/-66.842400,10.500500;-66.846700,10.496200?overview=full&geometries=polyline"
        ]
    );
}

#[tokio::test]
async fn osrm_no_route_code_is_a_failure() {
    let (base, _) = mock_services::osrm(
        StatusCode::BAD_REQUEST,
        json!({ "code": "NoRoute", "message": "Impossible route between points" }),
    )
    .await;

    let err = osrm_client(base).fetch_route(&two_stops()).await.unwrap_err();
    assert!(matches!(err, RouteFailure::NoRoute(code) if code == "NoRoute"));
}

#[tokio::test]
async fn osrm_server_error_reports_status() {
    let (base, _) =
        mock_services::osrm(StatusCode::INTERNAL_SERVER_ERROR, json!("upstream down")).await;

    let err = osrm_client(base).fetch_route(&two_stops()).await.unwrap_err();
    assert!(matches!(
        err,
        RouteFailure::Provider(ProviderError::Status { status: 500 })
    ));
}

#[tokio::test]
async fn osrm_needs_two_waypoints() {
    let client = osrm_client("http://127.0.0.1:9".to_string());
    let err = client.fetch_route(&two_stops()[..1]).await.unwrap_err();
    assert!(matches!(err, RouteFailure::TooFewWaypoints(1)));
}

#[tokio::test]
async fn compute_route_swallows_failures() {
    let (base, recorder) = mock_services::osrm(
        StatusCode::OK,
        json!({ "code": "Ok", "routes": [] }),
    )
    .await;
    let client = osrm_client(base);
    let [pickup, stop] = two_stops();

    assert_eq!(compute_route(&client, pickup, &[stop]).await, None);
    assert_eq!(compute_route(&client, pickup, &[]).await, None);
    assert_eq!(recorder.entries().len(), 1, "single point must not hit the network");
}

// ============================================================================
// Nominatim
// ============================================================================

#[tokio::test]
async fn nominatim_reverse_formats_address() {
    let (base, recorder) = mock_services::nominatim(
        json!({
            "display_name": "12, Avenida Francisco de Miranda, Chacao, Caracas",
            "address": {
                "road": "Avenida Francisco de Miranda",
                "house_number": "12",
                "suburb": "Chacao"
            }
        }),
        json!([]),
    )
    .await;

    let address = nominatim_client(base)
        .reverse(LatLng::new(10.5, -66.9))
        .await
        .unwrap();
    assert_eq!(address, "Avenida Francisco de Miranda 12 (Chacao)");
    assert_eq!(
        recorder.entries(),
        vec!["reverse?format=json&lat=10.5&lon=-66.9&zoom=18&addressdetails=1"]
    );
}

#[tokio::test]
async fn nominatim_search_parses_string_coordinates() {
    let (base, recorder) = mock_services::nominatim(
        json!({}),
        json!([{
            "lat": "10.5006",
            "lon": "-66.8871",
            "display_name": "Plaza Venezuela, Caracas, Venezuela"
        }]),
    )
    .await;

    let place = nominatim_client(base)
        .search("Plaza Venezuela")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(place.location, LatLng::new(10.5006, -66.8871));
    assert_eq!(place.label, "Plaza Venezuela, Caracas, Venezuela");
    assert_eq!(
        recorder.entries(),
        vec!["search?format=json&limit=1&q=Plaza+Venezuela"]
    );
}

#[tokio::test]
async fn nominatim_search_without_hits_is_none() {
    let (base, _) = mock_services::nominatim(json!({}), json!([])).await;
    let place = nominatim_client(base).search("zzzz").await.unwrap();
    assert_eq!(place, None);
}

#[tokio::test]
async fn nominatim_search_rejects_garbage_coordinates() {
    let (base, _) = mock_services::nominatim(
        json!({}),
        json!([{ "lat": "north", "lon": "-66.8", "display_name": "x" }]),
    )
    .await;
    let err = nominatim_client(base).search("x").await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

// ============================================================================
// Link proxy
// ============================================================================

#[tokio::test]
async fn link_proxy_returns_final_url_and_body() {
    let (base, recorder) = mock_services::link_proxy(
        StatusCode::OK,
        json!({
            "contents": "<html>@10.4962,-66.8467</html>",
            "status": { "url": "https://www.google.com/maps/place/@10.4962,-66.8467,17z", "http_code": 200 }
        }),
    )
    .await;

    let client = LinkProxyClient::new(LinkProxyConfig {
        base_url: base,
        timeout_secs: 5,
    })
    .unwrap();
    let page = client
        .unwrap_link("https://maps.app.goo.gl/EVQ9oBGiuagyzqTx7")
        .await
        .unwrap();

    assert_eq!(
        page.final_url.as_deref(),
        Some("https://www.google.com/maps/place/@10.4962,-66.8467,17z")
    );
    assert_eq!(page.body, "<html>@10.4962,-66.8467</html>");
    assert_eq!(recorder.entries(), vec!["https://maps.app.goo.gl/EVQ9oBGiuagyzqTx7"]);
}

#[tokio::test]
async fn link_proxy_error_status_is_transport_failure() {
    let (base, _) = mock_services::link_proxy(StatusCode::BAD_GATEWAY, json!({})).await;
    let client = LinkProxyClient::new(LinkProxyConfig {
        base_url: base,
        timeout_secs: 5,
    })
    .unwrap();

    let err = client.unwrap_link("https://goo.gl/x").await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}
