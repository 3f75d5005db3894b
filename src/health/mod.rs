//! Service health endpoint.
//!
//! `/health` reports static service identification plus the configured proxy
//! domain. It never touches the upstream and always answers 200.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "clarity-proxy";

/// Path the health handler is mounted on.
pub const HEALTH_PATH: &str = "/health";

/// Health payload. Field order is the serialized key order.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub domain: String,
}

impl HealthStatus {
    pub fn ok(domain: impl Into<String>) -> Self {
        Self {
            status: "ok",
            service: SERVICE_NAME,
            domain: domain.into(),
        }
    }
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus::ok(state.config.proxy_domain.as_str()))
}
