//! Current user handler.

use crate::auth::UserClaims;
use crate::models::CurrentUserResponse;
use axum::{Extension, Json};
use tracing::instrument;

/// Handler for GET /api/user/me
///
/// Echoes the identity established by the authentication filter. The
/// authorization stage has already rejected anonymous callers.
#[instrument(skip_all, name = "gk.handlers.current_user")]
pub async fn current_user(Extension(claims): Extension<UserClaims>) -> Json<CurrentUserResponse> {
    tracing::debug!(target: "gk.handlers.user", "Returning current user");

    Json(CurrentUserResponse {
        user_id: claims.sub,
        username: claims.username,
        roles: claims.roles,
        expires_at: claims.exp,
    })
}
