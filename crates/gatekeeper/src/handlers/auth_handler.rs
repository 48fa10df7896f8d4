use crate::errors::GatekeeperError;
use crate::models::{LoginRequest, RegisterRequest, RegistrationResponse, TokenResponse};
use crate::routes::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handle account registration
///
/// POST /api/auth/register
#[instrument(skip_all, name = "gk.handlers.register")]
pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), GatekeeperError> {
    let registered = state
        .user_service
        .register(&payload.username, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(registered)))
}

/// Handle login
///
/// POST /api/auth/login
#[instrument(skip_all, name = "gk.handlers.login")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, GatekeeperError> {
    let token = state
        .user_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(TokenResponse {
        access_token: token.access_token,
        token_type: token.token_type,
        expires_in: token.expires_in,
    }))
}
