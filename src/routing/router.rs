//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the ordered route table
//! - Look up the matching route for a path and query
//! - Build the upstream URL for the matched route
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in table order; first pattern that matches decides
//! - Explicit no-match rather than silent default

use url::form_urlencoded;

use crate::config::UpstreamConfig;
use crate::routing::matcher::{ExactMatcher, Matcher, PathPrefixMatcher};

/// How a route turns the matched request into an upstream URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `base` + value of query parameter `param`. No match if it is missing or empty.
    QueryParam { base: String, param: &'static str },
    /// `base` + unmatched path remainder, optionally followed by `?<raw query>`.
    Remainder { base: String, forward_query: bool },
    /// Always the same URL; the inbound query is dropped.
    Fixed(String),
}

impl Target {
    fn resolve(&self, rest: &str, query: Option<&str>) -> Option<String> {
        match self {
            Target::QueryParam { base, param } => {
                let value = query.and_then(|q| query_value(q, param))?;
                if value.is_empty() {
                    return None;
                }
                Some(format!("{}{}", base, value))
            }
            Target::Remainder { base, forward_query } => match query {
                Some(q) if *forward_query && !q.is_empty() => Some(format!("{}{}?{}", base, rest, q)),
                _ => Some(format!("{}{}", base, rest)),
            },
            Target::Fixed(url) => Some(url.clone()),
        }
    }
}

/// First decoded value of `key` in a query string.
fn query_value(query: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// A compiled route.
#[derive(Debug)]
pub struct Route {
    /// Route identifier for logging/metrics.
    pub name: &'static str,
    matcher: Box<dyn Matcher>,
    target: Target,
    /// Whether script responses on this route get their vendor URLs rewritten.
    pub rewrite: bool,
}

impl Route {
    pub fn new(name: &'static str, matcher: Box<dyn Matcher>, target: Target, rewrite: bool) -> Self {
        Self {
            name,
            matcher,
            target,
            rewrite,
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: &'static str,
    pub target_url: String,
    pub rewrite: bool,
}

/// Ordered route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Build a router from routes already in priority order.
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The five analytics routes, in priority order.
    pub fn from_config(upstream: &UpstreamConfig) -> Self {
        Self::new(vec![
            Route::new(
                "tag",
                Box::new(ExactMatcher::new("/ms/t.js")),
                Target::QueryParam { base: upstream.tag_base.clone(), param: "id" },
                true,
            ),
            Route::new(
                "script",
                Box::new(PathPrefixMatcher::new("/ms/j/")),
                Target::Remainder { base: upstream.script_base.clone(), forward_query: false },
                true,
            ),
            Route::new(
                "pixel",
                Box::new(ExactMatcher::new("/ms/i.gif")),
                Target::Fixed(upstream.pixel_url.clone()),
                false,
            ),
            Route::new(
                "cdn",
                Box::new(PathPrefixMatcher::new("/ms/c/")),
                Target::Remainder { base: upstream.cdn_base.clone(), forward_query: true },
                false,
            ),
            Route::new(
                "collect",
                Box::new(ExactMatcher::new("/ms/p")),
                Target::Fixed(upstream.collect_url.clone()),
                false,
            ),
        ])
    }

    /// Find the route for a raw path and query.
    ///
    /// The first route whose path pattern matches decides the outcome; if
    /// that route cannot build a target (missing `id`), there is no match.
    pub fn resolve(&self, path: &str, query: Option<&str>) -> Option<RouteMatch> {
        let (route, rest) = self
            .routes
            .iter()
            .find_map(|route| route.matcher.matches(path).map(|rest| (route, rest)))?;

        let target_url = route.target.resolve(rest, query)?;
        Some(RouteMatch {
            name: route.name,
            target_url,
            rewrite: route.rewrite,
        })
    }

    /// Number of compiled routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
