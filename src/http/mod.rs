//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → cors.rs (OPTIONS short-circuit)
//!     → [routing decides upstream URL]
//!     → request.rs + forwarder.rs (outbound call)
//!     → response.rs (rewrite, header filtering, CORS)
//!     → Send to client
//! ```

pub mod cors;
pub mod forwarder;
pub mod request;
pub mod response;
pub mod server;

pub use forwarder::{ForwardError, Forwarder, UpstreamResponse};
pub use server::{AppState, HttpServer, ServerError};
