//! Account registration and login.
//!
//! Passwords are hashed with the configured [`PasswordEncoder`] on a blocking
//! thread. Login runs a bcrypt verification even for unknown usernames so the
//! response time does not reveal which accounts exist.

use crate::auth::{IssuedToken, JwtIssuer};
use crate::crypto::PasswordEncoder;
use crate::errors::GatekeeperError;
use crate::models::RegistrationResponse;
use crate::repositories::{UserRecord, UserStore};
use common::secret::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt only looks at the first 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 32;
const DEFAULT_ROLE: &str = "user";

#[derive(Clone)]
pub struct UserService {
    store: UserStore,
    encoder: PasswordEncoder,
    issuer: JwtIssuer,
    dummy_hash: Arc<str>,
}

impl UserService {
    /// # Errors
    ///
    /// Returns `GatekeeperError::Crypto` if the timing-equalization hash
    /// cannot be computed.
    pub fn new(
        store: UserStore,
        encoder: PasswordEncoder,
        issuer: JwtIssuer,
    ) -> Result<Self, GatekeeperError> {
        let dummy_hash = encoder.encode(&Uuid::new_v4().to_string())?;
        Ok(Self {
            store,
            encoder,
            issuer,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    #[instrument(skip_all, name = "gk.service.register")]
    pub async fn register(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<RegistrationResponse, GatekeeperError> {
        let username = validate_username(username)?;
        validate_password(password.expose_secret())?;

        if self.store.find_by_username(&username).await.is_some() {
            return Err(GatekeeperError::Conflict(
                "An account with this username already exists".to_string(),
            ));
        }

        let password_hash = self.encode_blocking(owned(password)).await?;

        let roles = vec![DEFAULT_ROLE.to_string()];
        // insert() re-checks uniqueness under the write lock
        let record = self
            .store
            .insert(UserRecord {
                user_id: Uuid::new_v4(),
                username,
                password_hash,
                roles,
                created_at: chrono::Utc::now(),
            })
            .await?;

        tracing::info!(target: "gk.service.user", "Account registered");

        let token = self
            .issuer
            .issue(record.user_id, &record.username, &record.roles)?;

        Ok(RegistrationResponse {
            user_id: record.user_id,
            username: record.username,
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
        })
    }

    #[instrument(skip_all, name = "gk.service.login")]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<IssuedToken, GatekeeperError> {
        let record = self.store.find_by_username(username).await;

        let hash = match &record {
            Some(record) => record.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };

        let password_ok = self.matches_blocking(owned(password), hash).await?;

        match record {
            Some(record) if password_ok => {
                tracing::debug!(target: "gk.service.user", "Login succeeded");
                self.issuer
                    .issue(record.user_id, &record.username, &record.roles)
            }
            _ => {
                tracing::debug!(target: "gk.service.user", "Login rejected");
                Err(GatekeeperError::InvalidCredentials)
            }
        }
    }

    async fn encode_blocking(&self, password: SecretString) -> Result<String, GatekeeperError> {
        let encoder = self.encoder;
        tokio::task::spawn_blocking(move || encoder.encode(password.expose_secret()))
            .await
            .map_err(|e| {
                tracing::error!(target: "gk.service.user", error = %e, "Hashing task failed");
                GatekeeperError::Internal
            })?
    }

    async fn matches_blocking(
        &self,
        password: SecretString,
        hash: String,
    ) -> Result<bool, GatekeeperError> {
        let encoder = self.encoder;
        tokio::task::spawn_blocking(move || encoder.matches(password.expose_secret(), &hash))
            .await
            .map_err(|e| {
                tracing::error!(target: "gk.service.user", error = %e, "Verification task failed");
                GatekeeperError::Internal
            })?
    }
}

fn owned(password: &SecretString) -> SecretString {
    SecretString::from(password.expose_secret().to_owned())
}

fn validate_username(username: &str) -> Result<String, GatekeeperError> {
    let username = username.trim();
    let length = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&length) {
        return Err(GatekeeperError::BadRequest(format!(
            "Username must be {}-{} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(GatekeeperError::BadRequest(
            "Username may only contain letters, digits, '_', '-' and '.'".to_string(),
        ));
    }
    Ok(username.to_string())
}

fn validate_password(password: &str) -> Result<(), GatekeeperError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(GatekeeperError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(GatekeeperError::BadRequest(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}
