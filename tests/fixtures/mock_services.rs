//! Minimal axum servers imitating the external HTTP APIs.
//!
//! Each server answers every request with a canned status and JSON body and
//! records what it was asked, so tests can check the wire format.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, RawQuery};
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::Value;

/// Requests seen by a mock server.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn push(&self, entry: String) {
        self.0.lock().expect("recorder lock").push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("recorder lock").clone()
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    format!("http://{addr}")
}

/// OSRM `/route/v1/{profile}/{coords}`. Records `"{profile}/{coords}?{query}"`.
pub async fn osrm(status: StatusCode, body: Value) -> (String, Recorder) {
    let recorder = Recorder::default();
    let seen = recorder.clone();
    let app = Router::new().route(
        "/route/v1/:profile/:coords",
        get(
            move |Path((profile, coords)): Path<(String, String)>, RawQuery(query): RawQuery| {
                let seen = seen.clone();
                let body = body.clone();
                async move {
                    seen.push(format!("{profile}/{coords}?{}", query.unwrap_or_default()));
                    (status, axum::Json(body))
                }
            },
        ),
    );
    (serve(app).await, recorder)
}

/// Nominatim `/reverse` and `/search`. Records `"{path}?{query}"`.
pub async fn nominatim(reverse: Value, search: Value) -> (String, Recorder) {
    let recorder = Recorder::default();
    let seen_reverse = recorder.clone();
    let seen_search = recorder.clone();
    let app = Router::new()
        .route(
            "/reverse",
            get(move |RawQuery(query): RawQuery| {
                let seen = seen_reverse.clone();
                let body = reverse.clone();
                async move {
                    seen.push(format!("reverse?{}", query.unwrap_or_default()));
                    axum::Json(body)
                }
            }),
        )
        .route(
            "/search",
            get(move |RawQuery(query): RawQuery| {
                let seen = seen_search.clone();
                let body = search.clone();
                async move {
                    seen.push(format!("search?{}", query.unwrap_or_default()));
                    axum::Json(body)
                }
            }),
        );
    (serve(app).await, recorder)
}

/// AllOrigins-style `/get?url=...`. Records the decoded `url` parameter.
pub async fn link_proxy(status: StatusCode, body: Value) -> (String, Recorder) {
    let recorder = Recorder::default();
    let seen = recorder.clone();
    let app = Router::new().route(
        "/get",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.push(params.get("url").cloned().unwrap_or_default());
                (status, axum::Json(body))
            }
        }),
    );
    (serve(app).await, recorder)
}
