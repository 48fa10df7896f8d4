//! Authorization stage.
//!
//! Evaluates the [`AccessPolicy`] for the request's method and path and
//! rejects protected routes that reached this point without a validated
//! identity.

use crate::errors::GatekeeperError;
use crate::middleware::auth::{ClaimsExt, InvalidBearerToken};
use crate::observability::metrics::record_access_decision;
use crate::policy::{AccessDecision, AccessPolicy};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct AuthorizationState {
    pub policy: Arc<AccessPolicy>,
}

#[instrument(skip_all, name = "gk.middleware.authorization")]
pub async fn authorize(
    State(state): State<Arc<AuthorizationState>>,
    req: Request,
    next: Next,
) -> Result<Response, GatekeeperError> {
    let authenticated = req.claims().is_some();
    let access = state.policy.evaluate(req.method(), req.uri().path());
    let decision = access.decision_for(authenticated);

    match decision {
        AccessDecision::Permit => {
            record_access_decision(access.as_str(), "permit");
            Ok(next.run(req).await)
        }
        AccessDecision::Deny => {
            record_access_decision(access.as_str(), "deny");
            tracing::debug!(
                target: "gk.middleware.authorization",
                method = %req.method(),
                access = %access,
                "Rejected unauthenticated request to protected route"
            );
            if req.extensions().get::<InvalidBearerToken>().is_some() {
                Err(GatekeeperError::InvalidToken(
                    "The access token is invalid or expired".to_string(),
                ))
            } else {
                Err(GatekeeperError::Unauthorized)
            }
        }
    }
}
