//! Health endpoint.

use std::sync::Arc;

use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use plinth_core::Envelope;

use crate::http::respond;
use crate::http::server::AppState;

/// GET /health - liveness probe, no auth
async fn health() -> Response {
    respond::json(Envelope::ok(json!({ "status": "up" })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
