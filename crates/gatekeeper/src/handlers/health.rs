//! Service banner and liveness.

use crate::models::HealthResponse;
use axum::Json;

/// Handler for GET /
pub async fn root() -> &'static str {
    "Movieflix gatekeeper"
}

/// Handler for GET /api/health
///
/// Liveness only. Does not touch the account store.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP" })
}
