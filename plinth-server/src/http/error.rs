//! API error type mapped onto the response envelope.
//!
//! Database details are logged and replaced with a generic message before
//! leaving the process.

use axum::response::{IntoResponse, Response};

use plinth_core::Envelope;

use crate::db::DbError;
use crate::http::respond;

/// API error type with automatic envelope mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation { message: String },

    /// No resolvable user (401)
    Unauthorized,

    /// Access denied (403)
    Forbidden { reason: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = match &self {
            Self::Validation { message } => Envelope::fail(400, message.clone()),
            Self::Unauthorized => Envelope::unauthorized(),
            Self::Forbidden { reason } => Envelope::fail(403, reason.clone()),
            Self::NotFound { resource, id } => {
                Envelope::fail(404, format!("{} '{}' not found", resource, id))
            }
            Self::Database(err) => {
                tracing::error!("database error: {err}");
                Envelope::fail(500, "an internal error occurred")
            }
            Self::Internal { message } => {
                tracing::error!("internal error: {message}");
                Envelope::fail(500, "an internal error occurred")
            }
        };

        respond::json(envelope)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self::Database(err)
    }
}
