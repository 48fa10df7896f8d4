//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used across the gatekeeper for passwords,
//! bearer tokens and the JWT signing secret.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so a
//! struct deriving `Debug` that holds one of them is safe to log. Values are
//! zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let req = LoginRequest {
//!     username: "neo".to_string(),
//!     password: SecretString::from("red-pill"),
//! };
//!
//! assert!(!format!("{req:?}").contains("red-pill"));
//! assert_eq!(req.password.expose_secret(), "red-pill");
//! ```
//!
//! Use `SecretString` for user passwords and bearer tokens, and
//! `SecretBox<Vec<u8>>` for binary key material such as the decoded HMAC
//! signing secret.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
