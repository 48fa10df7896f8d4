//! HTTP request handlers for the gatekeeper.

pub mod auth_handler;
pub mod health;
pub mod metrics;
pub mod user;

pub use auth_handler::{handle_login, handle_register};
pub use health::{health_check, root};
pub use metrics::metrics_handler;
pub use user::current_user;
