use base64::{engine::general_purpose, Engine as _};
use common::secret::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default bind address for the public listener.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default JWT clock skew tolerance in seconds (5 minutes).
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Maximum allowed JWT clock skew tolerance in seconds (10 minutes).
pub const MAX_JWT_CLOCK_SKEW_SECONDS: i64 = 600;

/// Default access token lifetime in seconds (1 hour).
pub const DEFAULT_JWT_TTL_SECONDS: i64 = 3600;

/// Bounds for the access token lifetime.
pub const MIN_JWT_TTL_SECONDS: i64 = 60;
pub const MAX_JWT_TTL_SECONDS: i64 = 86_400;

/// Default bcrypt cost factor (~200ms per hash).
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum bcrypt cost accepted. Lower values are too cheap to brute force.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum bcrypt cost accepted. Higher values push login latency past ~800ms.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Default `Access-Control-Max-Age` for preflight responses.
pub const DEFAULT_CORS_MAX_AGE_SECONDS: u64 = 3600;

/// Minimum decoded length of the HMAC signing secret.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Environment variable holding the comma-separated CORS origin patterns.
pub const CORS_ALLOWED_ORIGINS_VAR: &str = "CORS_ALLOWED_ORIGINS";

/// Property-style alias accepted for the same setting.
pub const CORS_ALLOWED_ORIGINS_ALIAS: &str = "cors.allowed-origins";

/// Gatekeeper configuration, loaded once at startup and immutable afterwards.
pub struct Config {
    pub bind_address: String,
    /// Prometheus exposition listener. Never served on the public surface.
    pub metrics_bind_address: Option<String>,
    /// Raw comma-separated origin pattern list.
    pub cors_allowed_origins: String,
    pub cors_max_age_seconds: u64,
    /// Decoded HMAC-SHA256 signing secret.
    pub jwt_secret: SecretBox<Vec<u8>>,
    pub jwt_clock_skew_seconds: i64,
    pub jwt_ttl_seconds: i64,
    pub bcrypt_cost: u32,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            bind_address: self.bind_address.clone(),
            metrics_bind_address: self.metrics_bind_address.clone(),
            cors_allowed_origins: self.cors_allowed_origins.clone(),
            cors_max_age_seconds: self.cors_max_age_seconds,
            jwt_secret: SecretBox::new(Box::new(self.jwt_secret.expose_secret().clone())),
            jwt_clock_skew_seconds: self.jwt_clock_skew_seconds,
            jwt_ttl_seconds: self.jwt_ttl_seconds,
            bcrypt_cost: self.bcrypt_cost,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("metrics_bind_address", &self.metrics_bind_address)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("cors_max_age_seconds", &self.cors_max_age_seconds)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("jwt_ttl_seconds", &self.jwt_ttl_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Invalid JWT clock skew: {0}")]
    InvalidClockSkew(String),

    #[error("Invalid JWT TTL: {0}")]
    InvalidTtl(String),

    #[error("Invalid bcrypt cost: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid CORS max age: {0}")]
    InvalidCorsMaxAge(String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let metrics_bind_address = vars
            .get("METRICS_BIND_ADDRESS")
            .filter(|v| !v.trim().is_empty())
            .cloned();

        // A missing origin list is not an error: it yields an empty policy
        // that rejects every cross-origin request.
        let cors_allowed_origins = vars
            .get(CORS_ALLOWED_ORIGINS_VAR)
            .or_else(|| vars.get(CORS_ALLOWED_ORIGINS_ALIAS))
            .cloned()
            .unwrap_or_default();

        let cors_max_age_seconds = match vars.get("CORS_MAX_AGE_SECONDS") {
            Some(value) => value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidCorsMaxAge(format!("'{}' is not a valid u64: {}", value, e))
            })?,
            None => DEFAULT_CORS_MAX_AGE_SECONDS,
        };

        let jwt_secret_base64 = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let jwt_secret = general_purpose::STANDARD
            .decode(jwt_secret_base64.trim())
            .map_err(ConfigError::Base64Error)?;

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }

        let jwt_clock_skew_seconds = match vars.get("JWT_CLOCK_SKEW_SECONDS") {
            Some(value) => {
                let skew = value.parse::<i64>().map_err(|e| {
                    ConfigError::InvalidClockSkew(format!(
                        "'{}' is not a valid integer: {}",
                        value, e
                    ))
                })?;
                if !(1..=MAX_JWT_CLOCK_SKEW_SECONDS).contains(&skew) {
                    return Err(ConfigError::InvalidClockSkew(format!(
                        "{} is out of range (must be 1-{})",
                        skew, MAX_JWT_CLOCK_SKEW_SECONDS
                    )));
                }
                skew
            }
            None => DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        };

        let jwt_ttl_seconds = match vars.get("JWT_TTL_SECONDS") {
            Some(value) => {
                let ttl = value.parse::<i64>().map_err(|e| {
                    ConfigError::InvalidTtl(format!("'{}' is not a valid integer: {}", value, e))
                })?;
                if !(MIN_JWT_TTL_SECONDS..=MAX_JWT_TTL_SECONDS).contains(&ttl) {
                    return Err(ConfigError::InvalidTtl(format!(
                        "{} is out of range (must be {}-{})",
                        ttl, MIN_JWT_TTL_SECONDS, MAX_JWT_TTL_SECONDS
                    )));
                }
                ttl
            }
            None => DEFAULT_JWT_TTL_SECONDS,
        };

        let bcrypt_cost = match vars.get("BCRYPT_COST") {
            Some(value) => {
                let cost = value.parse::<u32>().map_err(|e| {
                    ConfigError::InvalidBcryptCost(format!(
                        "'{}' is not a valid integer: {}",
                        value, e
                    ))
                })?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                    return Err(ConfigError::InvalidBcryptCost(format!(
                        "{} is out of range (must be {}-{})",
                        cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
                    )));
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        Ok(Config {
            bind_address,
            metrics_bind_address,
            cors_allowed_origins,
            cors_max_age_seconds,
            jwt_secret: SecretBox::new(Box::new(jwt_secret)),
            jwt_clock_skew_seconds,
            jwt_ttl_seconds,
            bcrypt_cost,
        })
    }
}
