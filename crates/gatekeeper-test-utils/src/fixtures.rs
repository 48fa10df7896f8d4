//! Deterministic configuration fixtures.

use common::secret::SecretBox;
use gatekeeper::config::{
    Config, DEFAULT_CORS_MAX_AGE_SECONDS, DEFAULT_JWT_CLOCK_SKEW_SECONDS, DEFAULT_JWT_TTL_SECONDS,
    MIN_BCRYPT_COST,
};

/// Fixed HS256 secret shared by the harness and token builders.
pub const TEST_JWT_SECRET: [u8; 32] = *b"movieflix-test-secret-32-bytes!!";

/// Origin allowed by [`test_config`].
pub const TEST_ALLOWED_ORIGIN: &str = "http://localhost:5500";

/// Configuration for an ephemeral test server.
///
/// Uses the lowest accepted bcrypt cost to keep tests fast.
pub fn test_config() -> Config {
    test_config_with_origins(TEST_ALLOWED_ORIGIN)
}

pub fn test_config_with_origins(origins: &str) -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        metrics_bind_address: None,
        cors_allowed_origins: origins.to_string(),
        cors_max_age_seconds: DEFAULT_CORS_MAX_AGE_SECONDS,
        jwt_secret: SecretBox::new(Box::new(TEST_JWT_SECRET.to_vec())),
        jwt_clock_skew_seconds: DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        jwt_ttl_seconds: DEFAULT_JWT_TTL_SECONDS,
        bcrypt_cost: MIN_BCRYPT_COST,
    }
}
