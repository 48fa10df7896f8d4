//! HTTP middleware for the gatekeeper.
//!
//! # Components
//!
//! - `auth` - bearer token authentication filter
//! - `authorization` - access policy enforcement
//! - `http_metrics` - request metrics
//! - `chain` - ordered composition of all of the above

pub mod auth;
pub mod authorization;
pub mod chain;
pub mod http_metrics;

pub use auth::{jwt_authentication, AuthState, ClaimsExt, InvalidBearerToken};
pub use authorization::{authorize, AuthorizationState};
pub use chain::{FilterStep, SecurityFilterChain};
pub use http_metrics::http_metrics_middleware;
