//! Upstream forwarding.
//!
//! # Responsibilities
//! - Buffer the inbound body
//! - Issue exactly one outbound request per inbound request
//! - Buffer the upstream response
//!
//! # Design Decisions
//! - Redirects are never followed; a 3xx goes back to the client untouched
//! - One total timeout covers connect, send and body read
//! - No retries: the first failure is final

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{request::Parts, header::InvalidHeaderValue, HeaderMap, StatusCode},
};
use reqwest::redirect::Policy;
use thiserror::Error;
use url::Url;

use crate::http::request::upstream_headers;

/// Errors that can occur while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Client body could not be read or exceeded the size limit.
    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    /// Route produced a URL that does not parse.
    #[error("invalid upstream URL '{url}': {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// URL parsed but has nothing to put in `Host`.
    #[error("upstream URL '{0}' has no host")]
    MissingHost(String),

    /// A header value could not be constructed.
    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// DNS, connect, TLS or timeout failure.
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Upstream answered but its body could not be read.
    #[error("failed to read upstream body: {0}")]
    ResponseBody(#[source] reqwest::Error),
}

/// Fully buffered upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Sends inbound requests on to the vendor.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl Forwarder {
    /// Create a forwarder with a total per-request timeout.
    pub fn new(timeout: Duration, max_body_bytes: usize, use_system_proxy: bool) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::none());
        if !use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }

    /// Forward one request to `target` and buffer the answer.
    pub async fn forward(
        &self,
        parts: &Parts,
        body: Body,
        peer: Option<SocketAddr>,
        target: &str,
    ) -> Result<UpstreamResponse, ForwardError> {
        let body = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(ForwardError::RequestBody)?;

        let url = Url::parse(target).map_err(|source| ForwardError::InvalidTarget {
            url: target.to_string(),
            source,
        })?;
        let authority = authority(&url).ok_or_else(|| ForwardError::MissingHost(target.to_string()))?;
        let headers = upstream_headers(&parts.headers, &authority, peer)?;

        let mut request = self
            .client
            .request(parts.method.clone(), url.as_str())
            .headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await.map_err(ForwardError::Transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(ForwardError::ResponseBody)?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// `host[:port]` of a URL, the port only when it is not the scheme default.
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
