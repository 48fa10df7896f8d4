//! Observability for the gatekeeper.
//!
//! Metrics are recorded through the `metrics` facade and exported in
//! Prometheus format on a dedicated listener (`METRICS_BIND_ADDRESS`), never
//! on the public HTTP surface.
//!
//! Tokens, passwords and user identifiers never appear in metric labels or
//! log fields.

pub mod metrics;
