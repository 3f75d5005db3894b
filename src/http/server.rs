//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, CORS preflight)
//! - Bind server to listener
//! - Dispatch requests to the route table
//! - Forward requests to the vendor and assemble responses

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::health::{health_handler, HEALTH_PATH};
use crate::http::{cors, forwarder::Forwarder, response};
use crate::observability::metrics;
use crate::rewrite::RewriteTable;
use crate::routing::Router as ProxyRouter;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The upstream HTTP client could not be built.
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    /// The listen address could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Accept loop or shutdown failed.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers. Everything in it is immutable.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub rewrite: Arc<RewriteTable>,
    pub forwarder: Arc<Forwarder>,
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    /// Derive route and rewrite tables from a validated configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let forwarder = Forwarder::new(
            Duration::from_secs(config.timeouts.upstream_secs),
            config.limits.max_body_bytes,
            config.upstream.use_system_proxy,
        )?;

        Ok(Self {
            router: Arc::new(ProxyRouter::from_config(&config.upstream)),
            rewrite: Arc::new(RewriteTable::new(&config.proxy_domain)),
            forwarder: Arc::new(forwarder),
            config: Arc::new(config),
        })
    }
}

/// HTTP server for the analytics proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let state = AppState::new(config)?;
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(HEALTH_PATH, any(health_handler))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(middleware::from_fn(cors::preflight)),
            )
    }

    /// A clone of the fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            proxy_domain = %self.state.config.proxy_domain,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.state.config
    }
}

/// Main proxy handler.
/// Looks up the route, forwards the request and assembles the response.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path();

    // 1. Match Route
    let route = match state.router.resolve(path, parts.uri.query()) {
        Some(r) => r,
        None => {
            tracing::debug!(method = %method, path = %path, "No route matched");
            metrics::record_request(method.as_str(), 404, "none", start_time);
            return (StatusCode::NOT_FOUND, "Not Found").into_response();
        }
    };

    // 2. Forward
    let upstream = match state.forwarder.forward(&parts, body, peer, &route.target_url).await {
        Ok(upstream) => upstream,
        Err(e) => {
            tracing::error!(
                method = %method,
                path = %path,
                target = %route.target_url,
                error = %e,
                "Upstream error"
            );
            metrics::record_request(method.as_str(), 502, route.name, start_time);
            return (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response();
        }
    };

    // 3. Rewrite and assemble
    let status = upstream.status;
    let response = response::assemble(
        upstream,
        route.rewrite,
        &state.rewrite,
        parts.headers.get(header::ORIGIN),
    );

    tracing::info!(
        method = %method,
        path = %path,
        target = %route.target_url,
        status = status.as_u16(),
        "Proxied request"
    );
    metrics::record_request(method.as_str(), status.as_u16(), route.name, start_time);

    response
}
