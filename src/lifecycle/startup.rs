//! Startup orchestration.
//!
//! # Responsibilities
//! - Log the effective configuration
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: a bind failure is returned, the caller exits
//! - Configuration is already validated when it gets here

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::health::HEALTH_PATH;
use crate::http::server::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Log the startup banner.
pub fn log_banner(config: &ProxyConfig) {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.listener.bind_address(),
        proxy_domain = %config.proxy_domain,
        health = %format!("{}{}", config.listener.port, HEALTH_PATH),
        "clarity-proxy starting"
    );
    tracing::info!(
        "Environment: PROXY_DOMAIN (default https://analytics.czl.net), LISTEN_PORT (default 8081), PROXY_CONFIG (optional TOML file)"
    );
}

/// Bind the configured listen address.
pub async fn bind(config: &ProxyConfig) -> Result<TcpListener, ServerError> {
    let address = config.listener.bind_address();
    TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind { address, source })
}

/// Run the proxy until SIGINT/SIGTERM.
pub async fn run(config: ProxyConfig) -> Result<(), ServerError> {
    log_banner(&config);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config)?;
    let listener = bind(server.config()).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await
}
