//! HTTP surface.
//!
//! Thin glue over the exporter: a landing page, the exposition endpoint,
//! and a liveness probe. Every request to the telemetry path runs one
//! complete collection cycle.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::exporter::Exporter;

/// Content type of the text exposition format.
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<Exporter>,
    pub telemetry_path: String,
}

/// Build the router: `/` landing page, the configured telemetry path, and
/// `/healthz`.
pub fn create_router(state: AppState) -> Router {
    let telemetry_path = state.telemetry_path.clone();
    Router::new()
        .route("/", get(landing_page))
        .route("/healthz", get(healthz))
        .route(&telemetry_path, get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html><head><title>SQL Exporter</title></head><body>\
         <h1>SQL Exporter</h1><p><a href='{}'>Metrics</a></p>\
         </body></html>",
        state.telemetry_path
    ))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.exporter.render().await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
