//! Request matchers used by access rules.
//!
//! Path patterns follow the Ant-style subset used by the route table:
//!
//! - `/**` matches every path
//! - `/api/auth/**` matches `/api/auth` and anything below it
//! - anything else matches exactly (a trailing slash on the request is ignored)
//!
//! Prefix matches are segment-aware: `/api/user/**` does not match `/api/users`.

use axum::http::Method;
use std::fmt;

/// Path pattern of a route rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// `/**`
    Any,
    /// `/api/movies/**` stored as `/api/movies`
    Prefix(String),
    /// `/api/health`
    Exact(String),
}

impl PathPattern {
    /// Parse an Ant-style pattern.
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if pattern == "/**" {
            return PathPattern::Any;
        }
        if let Some(prefix) = pattern.strip_suffix("/**") {
            return PathPattern::Prefix(prefix.to_string());
        }
        PathPattern::Exact(strip_trailing_slash(pattern).to_string())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Any => true,
            PathPattern::Exact(exact) => strip_trailing_slash(path) == exact,
            PathPattern::Prefix(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Any => write!(f, "/**"),
            PathPattern::Prefix(prefix) => write!(f, "{}/**", prefix),
            PathPattern::Exact(exact) => write!(f, "{}", exact),
        }
    }
}

fn strip_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Method constraint of a route rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatcher {
    Any,
    Only(Method),
}

impl MethodMatcher {
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Only(expected) => expected == method,
        }
    }
}

impl fmt::Display for MethodMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodMatcher::Any => write!(f, "*"),
            MethodMatcher::Only(method) => write!(f, "{}", method),
        }
    }
}

/// True if any path segment is `.` or `..`, either literally or once
/// `%2e`, `%2f` and `%5c` escapes are decoded.
///
/// Such paths may be normalized differently by upstream proxies, so they are
/// never matched against public rules. Backslashes count as separators.
pub fn has_dot_segment(path: &str) -> bool {
    decode_traversal_escapes(path)
        .split(['/', '\\'])
        .any(|segment| segment == "." || segment == "..")
}

/// Decode only the escapes that can form a traversal: `%2e` to `.`, `%2f`
/// to `/` and `%5c` to a backslash, case-insensitively. Every other byte is kept.
fn decode_traversal_escapes(path: &str) -> String {
    let mut decoded = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(idx) = rest.find('%') {
        let (before, from_percent) = rest.split_at(idx);
        decoded.push_str(before);

        let escape = from_percent.get(1..3).map(str::to_ascii_lowercase);
        match escape.as_deref() {
            Some("2e") => decoded.push('.'),
            Some("2f") => decoded.push('/'),
            Some("5c") => decoded.push('\\'),
            _ => {
                decoded.push('%');
                rest = from_percent.get(1..).unwrap_or("");
                continue;
            }
        }
        rest = from_percent.get(3..).unwrap_or("");
    }

    decoded.push_str(rest);
    decoded
}
