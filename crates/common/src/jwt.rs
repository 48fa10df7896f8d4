//! Bearer token claims and the pre/post checks that surround signature
//! verification.
//!
//! Callers run [`check_token_size`] on the raw string, verify the signature
//! themselves, then run [`validate_iat`] on the decoded claims. Whatever
//! fails, the caller only ever sees the same generic error text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on a bearer token, checked before base64 decoding.
///
/// Movieflix tokens carry a handful of short claims and stay well under 1KB.
pub const MAX_JWT_SIZE_BYTES: usize = 8 * 1024;

/// How far in the future `iat` may lie by default.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Largest skew `JWT_CLOCK_SKEW_SECONDS` may configure.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

const GENERIC_TOKEN_ERROR: &str = "The access token is invalid or expired";

/// Why a bearer token was refused.
///
/// Every variant displays the same generic message; the variant itself only
/// feeds logs and metrics.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtValidationError {
    #[error("{}", GENERIC_TOKEN_ERROR)]
    TokenTooLarge,

    /// Bad format, bad signature, wrong algorithm or expired.
    #[error("{}", GENERIC_TOKEN_ERROR)]
    InvalidToken,

    #[error("{}", GENERIC_TOKEN_ERROR)]
    IatTooFarInFuture,
}

/// Claims carried by a user bearer token.
///
/// # Fields
///
/// - `sub`: user UUID
/// - `username`: login name
/// - `roles`: granted roles (e.g. `["user"]`)
/// - `iat` / `exp`: Unix epoch seconds
/// - `jti`: unique token identifier
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Subject (user UUID) - redacted in Debug output.
    pub sub: String,

    /// Login name.
    pub username: String,

    /// Roles granted to the user.
    #[serde(default)]
    pub roles: Vec<String>,

    pub iat: i64,

    pub exp: i64,

    /// Unique token identifier - redacted in Debug output.
    pub jti: String,
}

impl fmt::Debug for UserClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserClaims")
            .field("sub", &"[REDACTED]")
            .field("username", &self.username)
            .field("roles", &self.roles)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("jti", &"[REDACTED]")
            .finish()
    }
}

/// Reject tokens larger than [`MAX_JWT_SIZE_BYTES`].
///
/// # Errors
///
/// Returns `JwtValidationError::TokenTooLarge` if the token exceeds the limit.
pub fn check_token_size(token: &str) -> Result<(), JwtValidationError> {
    match token.len() {
        len if len <= MAX_JWT_SIZE_BYTES => Ok(()),
        len => {
            tracing::debug!(target: "common.jwt", len, "Oversized bearer token");
            Err(JwtValidationError::TokenTooLarge)
        }
    }
}

/// Refuse tokens minted further in the future than `clock_skew` allows.
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture`.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), JwtValidationError> {
    validate_iat_at(iat, clock_skew, chrono::Utc::now().timestamp())
}

pub(crate) fn validate_iat_at(
    iat: i64,
    clock_skew: Duration,
    now: i64,
) -> Result<(), JwtValidationError> {
    let skew = i64::try_from(clock_skew.as_secs()).unwrap_or(i64::MAX);
    let latest_accepted = now.saturating_add(skew);

    if iat <= latest_accepted {
        return Ok(());
    }

    tracing::debug!(
        target: "common.jwt",
        iat,
        latest_accepted,
        "Bearer token issued in the future"
    );
    Err(JwtValidationError::IatTooFarInFuture)
}
