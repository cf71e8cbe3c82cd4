//! Response helpers with the exact content-type contract.
//!
//! axum's `Json` emits `application/json` without a charset; the envelope
//! contract pins `application/json; charset=UTF-8`, so headers are set
//! explicitly here.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use plinth_core::Envelope;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
pub const XML_CONTENT_TYPE: &str = "text/xml; charset=UTF-8";

/// Serialize an envelope; the HTTP status comes from its `code`.
pub fn json(envelope: Envelope) -> Response {
    let status = StatusCode::from_u16(envelope.code).unwrap_or(StatusCode::OK);
    let body = match serde_json::to_string(&envelope) {
        Ok(body) => body,
        Err(err) => {
            tracing::error!("envelope serialization failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
                r#"{"code":500,"status":"FAIL","message":"serialization failure","data":""}"#,
            )
                .into_response();
        }
    };

    (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
}

/// Emit a caller-provided XML document as `text/xml; charset=UTF-8`.
pub fn xml(body: impl Into<String>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
        body.into(),
    )
        .into_response()
}

/// Default-deny handler, installed as the router fallback so unrouted
/// paths answer 403 rather than 404.
pub async fn forbidden() -> Response {
    json(Envelope::forbidden())
}
