//! Security filter chain.
//!
//! The chain is an explicit, named, ordered list of request-processing steps.
//! Each step either short-circuits with a response (CORS preflight, 401,
//! timeout) or passes the request inward.
//!
//! ```text
//! request
//!   → http_metrics        (records every response)
//!   → trace               (request span)
//!   → cors                (answers preflight, decorates responses)
//!   → jwt_authentication  (UserClaims into extensions)
//!   → authorization       (AccessPolicy, 401 on deny)
//!   → timeout             (408 after the configured duration)
//!   → handler
//! ```
//!
//! CORS runs before authentication so that browser preflights never need
//! credentials.

use crate::auth::JwtValidator;
use crate::cors::CorsPolicy;
use crate::middleware::auth::{jwt_authentication, AuthState};
use crate::middleware::authorization::{authorize, AuthorizationState};
use crate::middleware::http_metrics::http_metrics_middleware;
use crate::policy::AccessPolicy;
use axum::{middleware, Router};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStep {
    HttpMetrics,
    Trace,
    Cors,
    JwtAuthentication,
    Authorization,
    Timeout,
}

impl FilterStep {
    pub fn name(self) -> &'static str {
        match self {
            FilterStep::HttpMetrics => "http_metrics",
            FilterStep::Trace => "trace",
            FilterStep::Cors => "cors",
            FilterStep::JwtAuthentication => "jwt_authentication",
            FilterStep::Authorization => "authorization",
            FilterStep::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outermost first.
const STEPS: [FilterStep; 6] = [
    FilterStep::HttpMetrics,
    FilterStep::Trace,
    FilterStep::Cors,
    FilterStep::JwtAuthentication,
    FilterStep::Authorization,
    FilterStep::Timeout,
];

#[derive(Clone)]
pub struct SecurityFilterChain {
    policy: Arc<AccessPolicy>,
    cors: CorsPolicy,
    jwt_validator: Arc<JwtValidator>,
    request_timeout: Duration,
}

impl SecurityFilterChain {
    pub fn new(policy: Arc<AccessPolicy>, cors: CorsPolicy, jwt_validator: Arc<JwtValidator>) -> Self {
        Self {
            policy,
            cors,
            jwt_validator,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Processing order, outermost first.
    pub fn steps(&self) -> &'static [FilterStep] {
        &STEPS
    }

    /// Wrap `router` in every step of the chain.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let auth_state = Arc::new(AuthState {
            jwt_validator: self.jwt_validator.clone(),
        });
        let authorization_state = Arc::new(AuthorizationState {
            policy: self.policy.clone(),
        });

        // Router::layer wraps what is already there, so the innermost step
        // has to be added first.
        STEPS.iter().rev().fold(router, |router, step| {
            tracing::debug!(target: "gk.chain", step = %step, "Installing filter step");
            match step {
                FilterStep::Timeout => router.layer(TimeoutLayer::new(self.request_timeout)),
                FilterStep::Authorization => router.layer(middleware::from_fn_with_state(
                    authorization_state.clone(),
                    authorize,
                )),
                FilterStep::JwtAuthentication => router.layer(middleware::from_fn_with_state(
                    auth_state.clone(),
                    jwt_authentication,
                )),
                FilterStep::Cors => router.layer(self.cors.layer()),
                FilterStep::Trace => router.layer(TraceLayer::new_for_http()),
                FilterStep::HttpMetrics => {
                    router.layer(middleware::from_fn(http_metrics_middleware))
                }
            }
        })
    }
}
