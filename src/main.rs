//! clarity-proxy
//!
//! First-party reverse proxy for Microsoft Clarity.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ OPTIONS? ──yes──▶ 204 + CORS
//!                        │
//!                        ▼
//!                  ┌───────────┐  no route  ┌─────┐
//!                  │  routing  │───────────▶│ 404 │
//!                  └─────┬─────┘            └─────┘
//!                        ▼
//!                  ┌───────────┐   error    ┌─────┐
//!                  │ forwarder │───────────▶│ 502 │
//!                  └─────┬─────┘            └─────┘
//!                        ▼
//!                  ┌───────────┐
//!                  │  rewrite  │  (script routes, JavaScript bodies)
//!                  └─────┬─────┘
//!                        ▼
//!     Client Response ◀── CORS + upstream headers + status + body
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use clarity_proxy::config::loader::resolve_config;
use clarity_proxy::config::Overrides;
use clarity_proxy::lifecycle::startup;
use clarity_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "clarity-proxy")]
#[command(about = "First-party reverse proxy for Microsoft Clarity", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Externally visible base URL of this proxy
    #[arg(long, env = "PROXY_DOMAIN")]
    proxy_domain: Option<String>,

    /// Port to listen on
    #[arg(long, env = "LISTEN_PORT")]
    listen_port: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let overrides = Overrides {
        proxy_domain: cli.proxy_domain,
        listen_port: cli.listen_port,
    };

    let config = resolve_config(cli.config.as_deref(), &overrides);
    let log_level = config
        .as_ref()
        .map(|c| c.observability.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&log_level);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
