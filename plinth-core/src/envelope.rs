//! Uniform JSON response envelope.
//!
//! Every JSON response carries the same four fields:
//! `{"code": int, "status": "SUCCESS"|"FAIL", "message": str, "data": ...}`.
//! Failure envelopes use an empty string for `data`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope status marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAIL")]
    Fail,
}

/// Uniform response body. Field order is part of the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub code: u16,
    pub status: Status,
    pub message: String,
    pub data: Value,
}

impl Envelope {
    /// Success envelope wrapping `data`.
    pub fn ok(data: impl Into<Value>) -> Self {
        Self {
            code: 200,
            status: Status::Success,
            message: String::new(),
            data: data.into(),
        }
    }

    /// Failure envelope. `code` doubles as the HTTP status.
    pub fn fail(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            status: Status::Fail,
            message: message.into(),
            data: Value::String(String::new()),
        }
    }

    /// 401 envelope for requests without a resolvable user.
    pub fn unauthorized() -> Self {
        Self::fail(401, "login expired, please sign in again")
    }

    /// 403 envelope for denied requests.
    pub fn forbidden() -> Self {
        Self::fail(403, "Forbidden")
    }
}
