//! Prometheus metrics for the gatekeeper.
//!
//! Names carry the `gk_` prefix. Counters end in `_total`, histograms in
//! `_seconds`. Every label value comes from a closed set, so raw request
//! paths never become label values.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

const HTTP_LATENCY_BUCKETS: [f64; 10] = [
    0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 5.000,
];

// bcrypt at cost 12 sits around 200ms
const BCRYPT_BUCKETS: [f64; 8] = [0.025, 0.050, 0.100, 0.200, 0.300, 0.500, 0.800, 1.500];

/// Paths reported under their own name.
const EXACT_ENDPOINTS: [&str; 5] = [
    "/",
    "/api/health",
    "/api/user/me",
    "/api/auth/login",
    "/api/auth/register",
];

/// Everything else below one of these prefixes is reported as the label.
const PREFIX_ENDPOINTS: [(&str, &str); 6] = [
    ("/api/auth", "/api/auth/*"),
    ("/api/movies", "/api/movies/*"),
    ("/api/user", "/api/user/*"),
    ("/api/logs", "/api/logs/*"),
    ("/api/groups", "/api/groups/*"),
    ("/api/media", "/api/media/*"),
];

/// Install the global Prometheus recorder.
///
/// # Errors
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("gk_http_request".to_string()),
            &HTTP_LATENCY_BUCKETS,
        )
        .and_then(|b| {
            b.set_buckets_for_metric(Matcher::Prefix("gk_bcrypt".to_string()), &BCRYPT_BUCKETS)
        })
        .map_err(|e| format!("Invalid histogram buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Prometheus recorder not installed: {e}"))
}

/// `gk_http_requests_total{method, endpoint, status_code}` and
/// `gk_http_request_duration_seconds{method, endpoint, outcome}`.
///
/// Fed by the outermost middleware, so 401s, preflight answers and router
/// 404/405s are all counted.
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let endpoint = endpoint_label(path);

    histogram!("gk_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "outcome" => outcome_label(status_code)
    )
    .record(duration.as_secs_f64());

    counter!("gk_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn outcome_label(status_code: u16) -> &'static str {
    match status_code {
        401 | 403 => "denied",
        408 | 504 => "timeout",
        s if s < 400 => "ok",
        _ => "error",
    }
}

fn endpoint_label(path: &str) -> &'static str {
    if let Some(exact) = EXACT_ENDPOINTS.iter().find(|e| **e == path) {
        return *exact;
    }

    PREFIX_ENDPOINTS
        .iter()
        .find(|(prefix, _)| {
            path.strip_prefix(*prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .map_or("/other", |&(_, label)| label)
}

/// Record an authorization decision
///
/// Metric: `gk_access_decisions_total`
/// Labels: `access`, `decision`
pub fn record_access_decision(access: &str, decision: &str) {
    counter!("gk_access_decisions_total",
        "access" => access.to_string(),
        "decision" => decision.to_string()
    )
    .increment(1);
}

/// `gk_token_validations_total{status, error_category}`
///
/// `error_category` is `none` for successful validations.
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    counter!("gk_token_validations_total",
        "status" => status.to_string(),
        "error_category" => error_category.unwrap_or("none").to_string()
    )
    .increment(1);
}

/// `gk_bcrypt_duration_seconds{operation}` where operation is `hash` or `verify`.
pub fn record_bcrypt_duration(operation: &str, duration: Duration) {
    histogram!("gk_bcrypt_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

/// Record a cross-origin request from an origin outside the policy
///
/// Metric: `gk_cors_rejections_total`
pub fn record_cors_rejection() {
    counter!("gk_cors_rejections_total").increment(1);
}
