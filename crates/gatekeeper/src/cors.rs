//! Cross-origin policy.
//!
//! Origins come from a comma-separated configuration string. Each entry is
//! trimmed and registered as an origin pattern; blank entries are dropped, so
//! an empty string produces a policy that allows no cross-origin reads.
//!
//! Patterns may contain `*` wildcards (`https://*.movieflix.app`,
//! `http://localhost:*`). Because credentials are allowed, the matching
//! origin is always echoed back verbatim, never as `*`.
//!
//! Negotiation itself (preflight short-circuit, `Vary`, header emission) is
//! delegated to [`tower_http::cors::CorsLayer`].

use crate::observability::metrics::record_cors_rejection;
use axum::http::{request::Parts, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::DEFAULT_CORS_MAX_AGE_SECONDS;

/// One allowed origin pattern, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPattern {
    pattern: String,
}

impl OriginPattern {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            pattern: trimmed.to_ascii_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, origin: &str) -> bool {
        wildcard_match(&self.pattern, &origin.trim().to_ascii_lowercase())
    }
}

/// `*` matches any run of characters, including an empty one.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or("");

    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let remaining: Vec<&str> = parts.collect();
    let Some((last, middle)) = remaining.split_last() else {
        // No wildcard: exact match
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = rest.get(idx + part.len()..).unwrap_or(""),
            None => return false,
        }
    }

    rest.ends_with(last)
}

/// Cross-origin policy applied to every path.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origins: Vec<OriginPattern>,
    max_age: Duration,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            origins: Vec::new(),
            max_age: Duration::from_secs(DEFAULT_CORS_MAX_AGE_SECONDS),
        }
    }
}

impl CorsPolicy {
    /// Build a policy from a comma-separated origin list.
    pub fn from_origin_list(raw: &str) -> Self {
        let origins: Vec<OriginPattern> = raw.split(',').filter_map(OriginPattern::parse).collect();

        if origins.is_empty() {
            tracing::warn!(
                target: "gk.cors",
                "No CORS origins configured, cross-origin requests will be rejected"
            );
        } else {
            tracing::info!(
                target: "gk.cors",
                origins = ?origins.iter().map(OriginPattern::as_str).collect::<Vec<_>>(),
                "CORS origin patterns registered"
            );
        }

        Self {
            origins,
            ..Self::default()
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn allowed_origins(&self) -> Vec<&str> {
        self.origins.iter().map(OriginPattern::as_str).collect()
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|pattern| pattern.matches(origin))
    }

    /// Credentials allowed; request headers and methods are mirrored back,
    /// which is the credential-compatible form of "allow all".
    pub fn layer(&self) -> CorsLayer {
        let patterns = Arc::new(self.origins.clone());

        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _parts: &Parts| {
                    let allowed = origin
                        .to_str()
                        .map(|o| patterns.iter().any(|p| p.matches(o)))
                        .unwrap_or(false);
                    if !allowed {
                        tracing::debug!(target: "gk.cors", origin = ?origin, "Origin not allowed");
                        record_cors_rejection();
                    }
                    allowed
                },
            ))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
            .max_age(self.max_age)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    #[test]
    fn test_from_origin_list_trims_whitespace() {
        let policy = CorsPolicy::from_origin_list("http://a.com, http://b.com");

        assert_eq!(policy.allowed_origins(), vec!["http://a.com", "http://b.com"]);
        assert!(policy.is_origin_allowed("http://a.com"));
        assert!(policy.is_origin_allowed("http://b.com"));
        assert!(!policy.is_origin_allowed("http://c.com"));
        assert!(!policy.is_origin_allowed("http://a.com.evil.net"));
    }

    #[test]
    fn test_empty_configuration_allows_nothing() {
        let policy = CorsPolicy::from_origin_list("");
        assert!(policy.allowed_origins().is_empty());
        assert!(!policy.is_origin_allowed("http://a.com"));
        assert!(!policy.is_origin_allowed(""));
    }

    #[test]
    fn test_blank_entries_dropped() {
        let policy = CorsPolicy::from_origin_list(" , http://a.com ,, ");
        assert_eq!(policy.allowed_origins(), vec!["http://a.com"]);
    }

    #[test]
    fn test_origin_matching_is_case_insensitive() {
        let policy = CorsPolicy::from_origin_list("https://MovieFlix.app");
        assert!(policy.is_origin_allowed("https://movieflix.app"));
        assert!(policy.is_origin_allowed("HTTPS://MOVIEFLIX.APP"));
    }

    #[test]
    fn test_wildcard_subdomain_pattern() {
        let policy = CorsPolicy::from_origin_list("https://*.movieflix.app");
        assert!(policy.is_origin_allowed("https://www.movieflix.app"));
        assert!(policy.is_origin_allowed("https://beta.eu.movieflix.app"));
        assert!(!policy.is_origin_allowed("https://movieflix.app.evil.com"));
        assert!(!policy.is_origin_allowed("http://www.movieflix.app"));
    }

    #[test]
    fn test_wildcard_port_pattern() {
        let policy = CorsPolicy::from_origin_list("http://localhost:*");
        assert!(policy.is_origin_allowed("http://localhost:5500"));
        assert!(policy.is_origin_allowed("http://localhost:3000"));
        assert!(!policy.is_origin_allowed("http://127.0.0.1:5500"));
    }

    #[test]
    fn test_lone_star_matches_any_origin() {
        let policy = CorsPolicy::from_origin_list("*");
        assert!(policy.is_origin_allowed("https://anything.example"));
    }

    #[test]
    fn test_wildcard_match_multiple_stars() {
        assert!(wildcard_match("https://*.*.app", "https://a.b.app"));
        assert!(!wildcard_match("https://*.*.app", "https://ab.ap"));
        assert!(wildcard_match("a*b*c", "abc"));
        assert!(!wildcard_match("a*b*c", "acb"));
    }

    fn cors_app(origins: &str) -> Router {
        Router::new()
            .route("/api/movies/1", get(|| async { "movie" }))
            .layer(CorsPolicy::from_origin_list(origins).layer())
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/movies/1")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_preflight_allowed_origin_echoed_with_credentials() {
        let response = cors_app("http://a.com, http://b.com")
            .oneshot(preflight("http://b.com"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://b.com"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "authorization"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET"
        );
    }

    #[tokio::test]
    async fn test_preflight_disallowed_origin_gets_no_allow_origin() {
        let response = cors_app("http://a.com")
            .oneshot(preflight("http://evil.com"))
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_empty_policy_blocks_every_origin() {
        let response = cors_app("").oneshot(preflight("http://a.com")).await.unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_simple_request_carries_allow_origin() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/movies/1")
            .header(header::ORIGIN, "http://a.com")
            .body(Body::empty())
            .unwrap();

        let response = cors_app("http://a.com").oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://a.com"
        );
    }
}
