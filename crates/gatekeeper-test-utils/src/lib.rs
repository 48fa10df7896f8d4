//! # Gatekeeper Test Utilities
//!
//! Shared test utilities for the Movieflix gatekeeper.
//!
//! This crate provides:
//! - Deterministic fixtures (fixed JWT secret, ready-made `Config`)
//! - Test data builders (`TestTokenBuilder`)
//! - Server test harness (`TestGatekeeperServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gatekeeper_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestGatekeeperServer::spawn().await?;
//!
//!     let token = TestTokenBuilder::new()
//!         .for_user("trinity")
//!         .sign();
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/api/user/me", server.url()))
//!         .bearer_auth(&token)
//!         .send()
//!         .await?;
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod server_harness;
pub mod token_builders;

pub use fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
