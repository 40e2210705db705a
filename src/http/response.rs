//! Response bodies.
//!
//! Two shapes leave the service: the lookup result and an RFC 7807 problem
//! document. Both are built per request and serialized with an explicit
//! UTF-8 content type, which axum's `Json` would not add.

use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Content type of successful responses and probes.
pub const JSON_UTF8: &str = "application/json;charset=utf-8";
/// Content type of problem documents.
pub const PROBLEM_JSON_UTF8: &str = "application/problem+json;charset=utf-8";

/// Fixed message reported by a successful lookup.
pub const SERVICE_RUNNING: &str = "Service running!";

/// Problem type URI for an unavailable service.
pub const SERVICE_UNAVAILABLE_TYPE: &str = "/problems/service-unavailable";
pub const SERVICE_UNAVAILABLE_TITLE: &str = "Service temporarily unavailable";

/// Successful lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl ServiceResponse {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: SERVICE_RUNNING.to_string(),
            status: StatusCode::OK.canonical_reason().unwrap_or("OK").to_string(),
        }
    }
}

impl IntoResponse for ServiceResponse {
    fn into_response(self) -> Response {
        json_response(StatusCode::OK, JSON_UTF8, &self)
    }
}

/// RFC 7807 problem detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
}

impl ProblemDetail {
    /// The one modelled failure: the lookup could not be served right now.
    ///
    /// Reported as 500 regardless of cause.
    pub fn service_unavailable(detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            problem_type: SERVICE_UNAVAILABLE_TYPE.to_string(),
            title: SERVICE_UNAVAILABLE_TITLE.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: detail.into(),
            instance: instance.into(),
        }
    }
}

impl IntoResponse for ProblemDetail {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        json_response(status, PROBLEM_JSON_UTF8, &self)
    }
}

fn json_response<T: Serialize>(status: StatusCode, content_type: &'static str, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(CONTENT_TYPE, HeaderValue::from_static(content_type))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
