//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default externally visible base URL of the proxy.
pub const DEFAULT_PROXY_DOMAIN: &str = "https://analytics.czl.net";

/// Default listen port (normalized form).
pub const DEFAULT_LISTEN_PORT: &str = ":8081";

/// Root configuration for the analytics proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Base URL this service is reachable at (e.g., "https://analytics.example.com").
    pub proxy_domain: String,

    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// Vendor endpoints requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            proxy_domain: DEFAULT_PROXY_DOMAIN.to_string(),
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Normalize user-supplied values in place.
    ///
    /// Strips one trailing slash from the proxy domain and makes sure the
    /// port carries a leading colon.
    pub fn normalize(&mut self) {
        if let Some(stripped) = self.proxy_domain.strip_suffix('/') {
            self.proxy_domain = stripped.to_string();
        }
        if !self.listener.port.starts_with(':') {
            self.listener.port = format!(":{}", self.listener.port);
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Port, normalized to ":<port>".
    pub port: String,
}

impl ListenerConfig {
    /// Full socket address string, e.g. "0.0.0.0:8081".
    pub fn bind_address(&self) -> String {
        format!("{}{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_LISTEN_PORT.to_string(),
        }
    }
}

/// Vendor endpoints. Bases ending in `/` have the route remainder appended.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Tag loader base; the `id` query value is appended.
    pub tag_base: String,

    /// Core script host base.
    pub script_base: String,

    /// Tracking pixel URL.
    pub pixel_url: String,

    /// CDN resource base.
    pub cdn_base: String,

    /// Data collection endpoint.
    pub collect_url: String,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` for outbound requests.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            tag_base: "https://www.clarity.ms/tag/".to_string(),
            script_base: "https://scripts.clarity.ms/".to_string(),
            pixel_url: "https://c.clarity.ms/c.gif".to_string(),
            cdn_base: "https://c.clarity.ms/".to_string(),
            collect_url: "https://k.clarity.ms/collect".to_string(),
            use_system_proxy: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one upstream exchange, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { upstream_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body buffered before forwarding.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
