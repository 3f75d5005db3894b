//! CORS handling.
//!
//! The proxy owns every `Access-Control-*` header it returns; upstream values
//! are discarded in `response.rs` and replaced by the set written here.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};

pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str =
    "DNT, User-Agent, X-Requested-With, If-Modified-Since, Cache-Control, Content-Type, Range, Authorization";
pub const MAX_AGE: &str = "1728000";

/// Overwrite the CORS headers in `headers`.
///
/// The allowed origin echoes the request's `Origin`, or `*` when absent.
pub fn apply_cors(headers: &mut HeaderMap, origin: Option<&HeaderValue>) {
    let origin = origin
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE));
}

/// Answer every `OPTIONS` request with 204 before routing.
pub async fn preflight(req: Request<Body>, next: Next) -> Response {
    if *req.method() != Method::OPTIONS {
        return next.run(req).await;
    }

    tracing::debug!(path = %req.uri().path(), "CORS preflight");

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    apply_cors(response.headers_mut(), req.headers().get(header::ORIGIN));
    response
}
