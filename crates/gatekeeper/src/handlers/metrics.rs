//! Prometheus exposition.
//!
//! Served only on the metrics listener (`METRICS_BIND_ADDRESS`), never on
//! the public router, so it is not subject to the access policy.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
#[tracing::instrument(skip_all, name = "gk.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
