//! Outbound request preparation.
//!
//! # Responsibilities
//! - Copy client headers onto the upstream request
//! - Point `Host` at the upstream authority
//! - Carry the client address in `X-Real-IP`
//!
//! # Design Decisions
//! - Duplicate header names stay separate entries (`HeaderMap::append`)
//! - Framing headers are recomputed by the client for the buffered body
//! - `X-Forwarded-For` is passed through as-is, never appended to

use std::net::SocketAddr;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};

pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Inbound headers that are never copied verbatim.
fn is_skipped(name: &HeaderName) -> bool {
    *name == header::HOST || *name == header::CONTENT_LENGTH || *name == header::TRANSFER_ENCODING
}

/// Client IP to report upstream: an existing `X-Real-IP` wins over the peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<HeaderValue> {
    if let Some(ip) = headers.get(&X_REAL_IP).filter(|v| !v.is_empty()) {
        return Some(ip.clone());
    }
    peer.and_then(|addr| HeaderValue::from_str(&addr.ip().to_string()).ok())
}

/// Build the header set for the upstream request.
///
/// `authority` is the target's `host[:port]`.
pub fn upstream_headers(
    inbound: &HeaderMap,
    authority: &str,
    peer: Option<SocketAddr>,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 2);
    for (name, value) in inbound.iter() {
        if is_skipped(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers.insert(header::HOST, HeaderValue::from_str(authority)?);

    match client_ip(inbound, peer) {
        Some(ip) => {
            headers.insert(X_REAL_IP, ip);
        }
        None => {
            headers.remove(X_REAL_IP);
        }
    }

    for name in [X_FORWARDED_FOR, header::REFERER] {
        if let Some(value) = inbound.get(&name).filter(|v| !v.is_empty()) {
            headers.insert(name, value.clone());
        }
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> Option<SocketAddr> {
        Some("203.0.113.7:51234".parse().unwrap())
    }

    #[test]
    fn test_host_replaced() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("analytics.example.com"));
        inbound.insert(header::USER_AGENT, HeaderValue::from_static("test-agent"));

        let headers = upstream_headers(&inbound, "scripts.clarity.ms", peer()).unwrap();
        assert_eq!(headers.get_all(header::HOST).iter().count(), 1);
        assert_eq!(headers[header::HOST], "scripts.clarity.ms");
        assert_eq!(headers[header::USER_AGENT], "test-agent");
    }

    #[test]
    fn test_multi_value_headers_preserved() {
        let mut inbound = HeaderMap::new();
        inbound.append(header::COOKIE, HeaderValue::from_static("a=1"));
        inbound.append(header::COOKIE, HeaderValue::from_static("b=2"));

        let headers = upstream_headers(&inbound, "k.clarity.ms", None).unwrap();
        let cookies: Vec<_> = headers.get_all(header::COOKIE).iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_real_ip_from_peer() {
        let headers = upstream_headers(&HeaderMap::new(), "k.clarity.ms", peer()).unwrap();
        assert_eq!(headers[X_REAL_IP], "203.0.113.7");
    }

    #[test]
    fn test_real_ip_from_ipv6_peer() {
        let peer: SocketAddr = "[2001:db8::1]:443".parse().unwrap();
        let headers = upstream_headers(&HeaderMap::new(), "k.clarity.ms", Some(peer)).unwrap();
        assert_eq!(headers[X_REAL_IP], "2001:db8::1");
    }

    #[test]
    fn test_real_ip_header_wins() {
        let mut inbound = HeaderMap::new();
        inbound.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.1"));

        let headers = upstream_headers(&inbound, "k.clarity.ms", peer()).unwrap();
        assert_eq!(headers[X_REAL_IP], "198.51.100.1");
    }

    #[test]
    fn test_no_real_ip_without_source() {
        let headers = upstream_headers(&HeaderMap::new(), "k.clarity.ms", None).unwrap();
        assert!(headers.get(X_REAL_IP).is_none());
    }

    #[test]
    fn test_forwarded_for_and_referer_unchanged() {
        let mut inbound = HeaderMap::new();
        inbound.insert(X_FORWARDED_FOR, HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        inbound.insert(header::REFERER, HeaderValue::from_static("https://shop.example.com/cart"));

        let headers = upstream_headers(&inbound, "k.clarity.ms", peer()).unwrap();
        assert_eq!(headers[X_FORWARDED_FOR], "10.0.0.1, 10.0.0.2");
        assert_eq!(headers[header::REFERER], "https://shop.example.com/cart");
    }

    #[test]
    fn test_framing_headers_dropped() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        inbound.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        inbound.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let headers = upstream_headers(&inbound, "k.clarity.ms", None).unwrap();
        assert!(headers.get(header::CONTENT_LENGTH).is_none());
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    }
}
