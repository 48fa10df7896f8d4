//! Movieflix Gatekeeper Library
//!
//! Request gatekeeping for the Movieflix HTTP API: decides which requests
//! reach a handler, which cross-origin callers may read responses, and how
//! passwords and bearer tokens are handled.
//!
//! # Modules
//!
//! - `auth` - Bearer token validation and issuance
//! - `config` - Service configuration
//! - `cors` - Cross-origin policy
//! - `crypto` - Password encoding and JWT signing
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Security filter chain
//! - `models` - Request and response payloads
//! - `observability` - Prometheus metrics
//! - `policy` - Route access rules
//! - `repositories` - Account storage
//! - `routes` - Router and application state
//! - `services` - Business logic layer

pub mod auth;
pub mod config;
pub mod cors;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod policy;
pub mod repositories;
pub mod routes;
pub mod services;
