//! Response assembly.
//!
//! # Responsibilities
//! - Rewrite script bodies on eligible routes
//! - Copy upstream headers, minus CORS and framing headers
//! - Apply the proxy's own CORS headers
//!
//! # Design Decisions
//! - Upstream status is preserved verbatim, redirects and errors included
//! - `Content-Length` is always recomputed from the final body
//! - Eligible routes always answer with a JavaScript content type

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
};

use crate::http::forwarder::UpstreamResponse;
use crate::rewrite::{is_javascript, RewriteTable, SCRIPT_CONTENT_TYPE};

/// Upstream headers the client never sees.
fn is_excluded(name: &HeaderName) -> bool {
    let name = name.as_str();
    name.starts_with("access-control-")
        || name == "content-length"
        || name == "transfer-encoding"
        || name == "connection"
}

/// Append every non-excluded upstream header to `out`.
pub fn copy_upstream_headers(upstream: &HeaderMap, out: &mut HeaderMap) {
    for (name, value) in upstream.iter() {
        if is_excluded(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
}

/// Turn a buffered upstream response into the client response.
pub fn assemble(
    upstream: UpstreamResponse,
    rewrite_eligible: bool,
    table: &RewriteTable,
    origin: Option<&HeaderValue>,
) -> Response {
    let content_type = upstream
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let body = if rewrite_eligible && is_javascript(content_type) {
        Body::from(table.apply(&upstream.body))
    } else {
        Body::from(upstream.body)
    };

    let mut response = Response::new(body);
    *response.status_mut() = upstream.status;

    let headers = response.headers_mut();
    crate::http::cors::apply_cors(headers, origin);
    copy_upstream_headers(&upstream.headers, headers);
    if rewrite_eligible {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(SCRIPT_CONTENT_TYPE));
    }

    response
}
