//! Access policy evaluation.
//!
//! An [`AccessPolicy`] is an ordered list of [`RouteRule`]s. Evaluation is a
//! linear first-match-wins scan; a request that matches no rule requires
//! authentication.
//!
//! # Default rules
//!
//! | method  | pattern          | access        |
//! |---------|------------------|---------------|
//! | OPTIONS | `/**`            | public        |
//! | *       | `/`              | public        |
//! | *       | `/api/health`    | public        |
//! | *       | `/api/auth/**`   | public        |
//! | GET     | `/api/movies/**` | public        |
//! | *       | `/api/user/**`   | authenticated |
//! | *       | `/api/logs/**`   | authenticated |
//! | *       | `/api/groups/**` | authenticated |
//! | *       | `/api/media/**`  | authenticated |
//! | *       | anything else    | authenticated |

pub mod matcher;

use axum::http::Method;
use std::fmt;

pub use matcher::{MethodMatcher, PathPattern};

/// Access level required by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Public,
    Authenticated,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Public => "public",
            AccessLevel::Authenticated => "authenticated",
        }
    }

    /// Combine the required level with whether the caller is authenticated.
    pub fn decision_for(self, authenticated: bool) -> AccessDecision {
        match (self, authenticated) {
            (AccessLevel::Public, _) | (AccessLevel::Authenticated, true) => AccessDecision::Permit,
            (AccessLevel::Authenticated, false) => AccessDecision::Deny,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of combining the required access level with the caller's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Permit,
    Deny,
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub method: MethodMatcher,
    pub pattern: PathPattern,
    pub access: AccessLevel,
}

impl RouteRule {
    pub fn new(method: MethodMatcher, pattern: &str, access: AccessLevel) -> Self {
        Self {
            method,
            pattern: PathPattern::parse(pattern),
            access,
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.matches(method) && self.pattern.matches(path)
    }
}

/// Ordered route table with a fallback access level.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<RouteRule>,
    fallback: AccessLevel,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::default_rules()
    }
}

impl AccessPolicy {
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::default()
    }

    /// The Movieflix route table.
    pub fn default_rules() -> Self {
        Self::builder()
            // CORS preflight
            .permit_all_for(Method::OPTIONS, "/**")
            // Public endpoints
            .permit_all("/")
            .permit_all("/api/health")
            .permit_all("/api/auth/**")
            .permit_all_for(Method::GET, "/api/movies/**")
            // Protected endpoints
            .authenticated("/api/user/**")
            .authenticated("/api/logs/**")
            .authenticated("/api/groups/**")
            .authenticated("/api/media/**")
            .any_request_authenticated()
            .build()
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Access level required for `method` on `path`.
    pub fn evaluate(&self, method: &Method, path: &str) -> AccessLevel {
        let rule = self.rules.iter().find(|rule| rule.matches(method, path));

        let level = match rule {
            Some(rule) => rule.access,
            None => self.fallback,
        };

        // Dot segments could be normalized onto a protected route further
        // downstream, so they never get public access unless preflight.
        if level == AccessLevel::Public
            && *method != Method::OPTIONS
            && matcher::has_dot_segment(path)
        {
            tracing::debug!(
                target: "gk.policy",
                method = %method,
                "Path contains dot segments, requiring authentication"
            );
            return AccessLevel::Authenticated;
        }

        level
    }

    /// Allow/deny decision for a request given whether it carries a valid identity.
    pub fn decide(&self, method: &Method, path: &str, authenticated: bool) -> AccessDecision {
        self.evaluate(method, path).decision_for(authenticated)
    }
}

/// Declarative builder preserving registration order.
#[derive(Debug)]
pub struct AccessPolicyBuilder {
    rules: Vec<RouteRule>,
    fallback: AccessLevel,
}

impl Default for AccessPolicyBuilder {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fallback: AccessLevel::Authenticated,
        }
    }
}

impl AccessPolicyBuilder {
    pub fn rule(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn permit_all(self, pattern: &str) -> Self {
        self.rule(RouteRule::new(MethodMatcher::Any, pattern, AccessLevel::Public))
    }

    pub fn permit_all_for(self, method: Method, pattern: &str) -> Self {
        self.rule(RouteRule::new(
            MethodMatcher::Only(method),
            pattern,
            AccessLevel::Public,
        ))
    }

    pub fn authenticated(self, pattern: &str) -> Self {
        self.rule(RouteRule::new(
            MethodMatcher::Any,
            pattern,
            AccessLevel::Authenticated,
        ))
    }

    pub fn authenticated_for(self, method: Method, pattern: &str) -> Self {
        self.rule(RouteRule::new(
            MethodMatcher::Only(method),
            pattern,
            AccessLevel::Authenticated,
        ))
    }

    pub fn any_request_authenticated(mut self) -> Self {
        self.fallback = AccessLevel::Authenticated;
        self
    }

    pub fn build(self) -> AccessPolicy {
        AccessPolicy {
            rules: self.rules,
            fallback: self.fallback,
        }
    }
}
