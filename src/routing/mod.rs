//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, raw query)
//!     → router.rs (ordered route scan)
//!     → matcher.rs (exact / prefix evaluation)
//!     → Return: RouteMatch { target_url, rewrite } or no match
//!
//! Route Compilation (at startup):
//!     UpstreamConfig
//!     → five rules in fixed priority order
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First match wins (table order)

pub mod matcher;
pub mod router;

pub use router::{RouteMatch, Router};
