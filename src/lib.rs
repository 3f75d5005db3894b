//! First-party relay for Microsoft Clarity analytics.
//!
//! Serves the vendor's tag, scripts, pixel, CDN assets and collection
//! endpoint under `/ms/...`, rewriting vendor URLs inside returned scripts so
//! follow-up requests come back through the proxy.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
