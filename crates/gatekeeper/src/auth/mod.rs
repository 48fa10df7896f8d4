//! Bearer token handling.
//!
//! # Components
//!
//! - `jwt` - token validation (used by the authentication filter) and issuance
//!   (used by the login and registration handlers)

pub mod jwt;

pub use common::jwt::UserClaims;
pub use jwt::{IssuedToken, JwtIssuer, JwtValidator};
