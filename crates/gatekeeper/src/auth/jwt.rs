//! HS256 token validation and issuance.

use crate::config::Config;
use crate::crypto;
use crate::errors::GatekeeperError;
use crate::observability::metrics::record_token_validation;
use common::jwt::{JwtValidationError, UserClaims};
use common::secret::{ExposeSecret, SecretBox};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

fn shared_secret(config: &Config) -> Arc<SecretBox<Vec<u8>>> {
    Arc::new(SecretBox::new(Box::new(
        config.jwt_secret.expose_secret().clone(),
    )))
}

/// Validates bearer tokens presented to the gatekeeper.
#[derive(Clone)]
pub struct JwtValidator {
    secret: Arc<SecretBox<Vec<u8>>>,
    clock_skew: Duration,
}

impl JwtValidator {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secret: shared_secret(config),
            clock_skew: Duration::from_secs(config.jwt_clock_skew_seconds.unsigned_abs()),
        }
    }

    /// Validate a raw token (without the `Bearer ` prefix).
    #[instrument(skip_all, name = "gk.auth.validate")]
    pub fn validate(&self, token: &str) -> Result<UserClaims, JwtValidationError> {
        match crypto::verify_user_jwt(token, self.secret.expose_secret(), self.clock_skew) {
            Ok(claims) => {
                record_token_validation("success", None);
                Ok(claims)
            }
            Err(e) => {
                let category = match e {
                    JwtValidationError::TokenTooLarge => "too_large",
                    JwtValidationError::InvalidToken => "invalid",
                    JwtValidationError::IatTooFarInFuture => "clock_skew",
                };
                record_token_validation("error", Some(category));
                Err(e)
            }
        }
    }
}

/// Token returned to a client after login or registration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Signs access tokens for authenticated users.
#[derive(Clone)]
pub struct JwtIssuer {
    secret: Arc<SecretBox<Vec<u8>>>,
    ttl_seconds: i64,
}

impl JwtIssuer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secret: shared_secret(config),
            ttl_seconds: config.jwt_ttl_seconds,
        }
    }

    #[instrument(skip_all, name = "gk.auth.issue")]
    pub fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[String],
    ) -> Result<IssuedToken, GatekeeperError> {
        let now = chrono::Utc::now().timestamp();
        let claims = UserClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            roles: roles.to_vec(),
            iat: now,
            exp: now + self.ttl_seconds,
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = crypto::sign_user_jwt(&claims, self.secret.expose_secret())?;

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.ttl_seconds.unsigned_abs(),
        })
    }
}
