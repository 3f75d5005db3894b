//! Script body rewriting.
//!
//! # Data Flow
//! ```text
//! upstream response (rewrite-eligible route)
//!     → is_javascript(content-type)?
//!     → table.rs (literal vendor URL → proxy URL substitution)
//!     → rewritten body
//! ```
//!
//! # Design Decisions
//! - Literal byte replacement only, no regex
//! - Table built once from the proxy domain, immutable afterwards
//! - Replacement targets never contain a source literal, so rewriting is idempotent

pub mod table;

pub use table::RewriteTable;

/// Content type forced onto every response of a rewrite-eligible route.
pub const SCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

/// Whether a declared content type is JavaScript.
///
/// Covers `application/javascript`, `application/x-javascript` and
/// `text/javascript`, with or without parameters.
pub fn is_javascript(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("javascript")
}
