use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::GatekeeperError;
use crate::observability::metrics::record_bcrypt_duration;
use common::jwt::{check_token_size, validate_iat, JwtValidationError, UserClaims};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{Duration, Instant};
use tracing::instrument;

/// One-way password encoder backed by bcrypt.
///
/// Every call to [`PasswordEncoder::encode`] draws a fresh salt, so the same
/// password never produces the same hash twice.
#[derive(Debug, Clone, Copy)]
pub struct PasswordEncoder {
    cost: u32,
}

impl PasswordEncoder {
    /// # Errors
    ///
    /// Returns `GatekeeperError::Crypto` if `cost` is outside 10-14.
    pub fn new(cost: u32) -> Result<Self, GatekeeperError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(GatekeeperError::Crypto(format!(
                "Invalid bcrypt cost: {} (must be {}-{})",
                cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password.
    #[instrument(skip_all, name = "gk.crypto.encode")]
    pub fn encode(&self, raw_password: &str) -> Result<String, GatekeeperError> {
        let start = Instant::now();
        let result = bcrypt::hash(raw_password, self.cost)
            .map_err(|e| GatekeeperError::Crypto(format!("Password hashing failed: {}", e)));
        record_bcrypt_duration("hash", start.elapsed());
        result
    }

    /// Check a plaintext password against a stored hash.
    #[instrument(skip_all, name = "gk.crypto.matches")]
    pub fn matches(&self, raw_password: &str, encoded: &str) -> Result<bool, GatekeeperError> {
        let start = Instant::now();
        let result = bcrypt::verify(raw_password, encoded)
            .map_err(|e| GatekeeperError::Crypto(format!("Password verification failed: {}", e)));
        record_bcrypt_duration("verify", start.elapsed());
        result
    }
}

/// Sign user claims as an HS256 JWT.
#[instrument(skip_all)]
pub fn sign_user_jwt(claims: &UserClaims, secret: &[u8]) -> Result<String, GatekeeperError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &EncodingKey::from_secret(secret))
        .map_err(|e| GatekeeperError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify an HS256 user JWT.
///
/// Validates, in order:
/// - Token size (before any parsing)
/// - Signature and algorithm
/// - Expiration (`exp`)
/// - Issued-at (`iat`) no further in the future than `clock_skew`
#[instrument(skip_all)]
pub fn verify_user_jwt(
    token: &str,
    secret: &[u8],
    clock_skew: Duration,
) -> Result<UserClaims, JwtValidationError> {
    check_token_size(token)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data =
        decode::<UserClaims>(token, &DecodingKey::from_secret(secret), &validation).map_err(
            |e| {
                tracing::debug!(target: "gk.crypto", error = %e, "Token verification failed");
                JwtValidationError::InvalidToken
            },
        )?;

    validate_iat(token_data.claims.iat, clock_skew)?;

    Ok(token_data.claims)
}
