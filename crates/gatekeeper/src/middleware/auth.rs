//! Bearer token authentication filter.
//!
//! Runs before the authorization stage on every request:
//! - No `Authorization` header: the request continues anonymously
//! - Valid bearer token: `UserClaims` are inserted into request extensions
//! - Malformed or invalid token: the request continues anonymously with an
//!   [`InvalidBearerToken`] marker, so a protected route can report why it
//!   was rejected while public routes keep working

use crate::auth::{JwtValidator, UserClaims};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication filter.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_validator: Arc<JwtValidator>,
}

/// Marker inserted when a bearer token was presented but rejected.
#[derive(Debug, Clone, Copy)]
pub struct InvalidBearerToken;

#[derive(Debug, PartialEq, Eq)]
enum BearerToken<'a> {
    Missing,
    Malformed,
    Present(&'a str),
}

/// Parse the Authorization header. The scheme is matched case-insensitively.
fn extract_bearer_token(req: &Request) -> BearerToken<'_> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return BearerToken::Missing;
    };

    let Ok(value) = value.to_str() else {
        return BearerToken::Malformed;
    };

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                BearerToken::Malformed
            } else {
                BearerToken::Present(token)
            }
        }
        _ => BearerToken::Malformed,
    }
}

#[instrument(skip_all, name = "gk.middleware.jwt_authentication")]
pub async fn jwt_authentication(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let outcome = match extract_bearer_token(&req) {
        BearerToken::Missing => None,
        BearerToken::Malformed => {
            tracing::debug!(target: "gk.middleware.auth", "Invalid Authorization header format");
            Some(Err(()))
        }
        BearerToken::Present(token) => Some(state.jwt_validator.validate(token).map_err(|e| {
            tracing::debug!(target: "gk.middleware.auth", error = ?e, "Bearer token rejected");
        })),
    };

    match outcome {
        Some(Ok(claims)) => {
            req.extensions_mut().insert(claims);
        }
        Some(Err(())) => {
            req.extensions_mut().insert(InvalidBearerToken);
        }
        None => {}
    }

    next.run(req).await
}

/// Extension trait for extracting claims from request.
pub trait ClaimsExt {
    /// Returns `None` for anonymous requests.
    fn claims(&self) -> Option<&UserClaims>;
}

impl<B> ClaimsExt for axum::http::Request<B> {
    fn claims(&self) -> Option<&UserClaims> {
        self.extensions().get::<UserClaims>()
    }
}
