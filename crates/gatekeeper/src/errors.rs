use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatekeeperError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl GatekeeperError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatekeeperError::Unauthorized
            | GatekeeperError::InvalidToken(_)
            | GatekeeperError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            GatekeeperError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatekeeperError::Conflict(_) => StatusCode::CONFLICT,
            GatekeeperError::Crypto(_) | GatekeeperError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatekeeperError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            GatekeeperError::Unauthorized => (
                "UNAUTHORIZED",
                "Full authentication is required to access this resource".to_string(),
            ),
            GatekeeperError::InvalidToken(reason) => ("INVALID_TOKEN", reason.clone()),
            GatekeeperError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
            ),
            GatekeeperError::BadRequest(reason) => ("BAD_REQUEST", reason.clone()),
            GatekeeperError::Conflict(reason) => ("CONFLICT", reason.clone()),
            GatekeeperError::Crypto(_) => (
                "CRYPTO_ERROR",
                "An internal cryptographic error occurred".to_string(),
            ),
            GatekeeperError::Internal => (
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
