//! Standard response headers.
//!
//! Every response, probes and error pages included, is marked uncacheable and
//! English. Handlers that set their own content type keep it; everything else
//! is labelled as UTF-8 JSON.

use axum::http::header::{CACHE_CONTROL, CONTENT_LANGUAGE, CONTENT_TYPE, EXPIRES, PRAGMA};
use axum::http::HeaderValue;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::http::response::JSON_UTF8;

/// Wrap `router` with the standard header layers.
pub fn with_standard_headers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            CONTENT_TYPE,
            HeaderValue::from_static(JSON_UTF8),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_LANGUAGE,
            HeaderValue::from_static("en"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            EXPIRES,
            HeaderValue::from_static("-1"),
        ))
}
