//! Builder for signed test tokens.

use crate::fixtures::TEST_JWT_SECRET;
use chrono::{Duration, Utc};
use common::jwt::UserClaims;
use gatekeeper::crypto::sign_user_jwt;
use uuid::Uuid;

/// Builder for user access tokens.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user("alice")
///     .with_role("admin")
///     .expires_in(60)
///     .sign();
/// ```
pub struct TestTokenBuilder {
    claims: UserClaims,
}

impl TestTokenBuilder {
    /// Defaults: fresh subject, role `user`, one hour lifetime.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            claims: UserClaims {
                sub: Uuid::new_v4().to_string(),
                username: "test-user".to_string(),
                roles: vec!["user".to_string()],
                iat: now.timestamp(),
                exp: (now + Duration::seconds(3600)).timestamp(),
                jti: Uuid::new_v4().to_string(),
            },
        }
    }

    pub fn for_user(mut self, username: &str) -> Self {
        self.claims.username = username.to_string();
        self
    }

    pub fn with_subject(mut self, sub: &str) -> Self {
        self.claims.sub = sub.to_string();
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.claims.roles.push(role.to_string());
        self
    }

    /// Expiration in seconds from now. Negative values produce an expired token.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.claims.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.claims.iat = timestamp;
        self
    }

    pub fn claims(&self) -> &UserClaims {
        &self.claims
    }

    /// Sign with [`TEST_JWT_SECRET`].
    pub fn sign(self) -> String {
        self.sign_with(&TEST_JWT_SECRET)
    }

    pub fn sign_with(self, secret: &[u8]) -> String {
        sign_user_jwt(&self.claims, secret).expect("test token signing should succeed")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
