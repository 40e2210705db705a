//! Per-request spans.
//!
//! Every request runs inside an `http_request` span carrying the request ID
//! assigned by the request-id layer, so handler logs can be correlated.

use axum::body::Body;
use axum::http::Request;
use tracing::Span;

use crate::http::request::X_REQUEST_ID;

/// Span factory for `TraceLayer::make_span_with`.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
