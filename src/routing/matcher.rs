//! Path matching logic.
//!
//! # Responsibilities
//! - Match exact paths
//! - Match path prefixes and hand back the remainder
//!
//! # Design Decisions
//! - Path matching is case-sensitive and literal
//! - Operates on the raw request path (no percent-decoding)
//! - No regex to guarantee O(n) matching

/// Trait for matching a request path against a pattern.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns the unmatched remainder of `path` if it matches, `None` otherwise.
    fn matches<'a>(&self, path: &'a str) -> Option<&'a str>;
}

/// Matches one path exactly. The remainder is always empty.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    path: String,
}

impl ExactMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactMatcher {
    fn matches<'a>(&self, path: &'a str) -> Option<&'a str> {
        (path == self.path).then_some("")
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
    }
}
