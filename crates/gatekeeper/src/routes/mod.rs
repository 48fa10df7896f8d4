//! HTTP routes for the gatekeeper.
//!
//! Defines the Axum router and application state.

use crate::auth::{JwtIssuer, JwtValidator};
use crate::config::Config;
use crate::cors::CorsPolicy;
use crate::crypto::PasswordEncoder;
use crate::errors::GatekeeperError;
use crate::handlers;
use crate::middleware::SecurityFilterChain;
use crate::policy::AccessPolicy;
use crate::repositories::UserStore;
use crate::services::UserService;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Route table evaluated by the authorization stage.
    pub policy: Arc<AccessPolicy>,

    /// Cross-origin policy built from `CORS_ALLOWED_ORIGINS`.
    pub cors: CorsPolicy,

    pub jwt_validator: Arc<JwtValidator>,

    pub user_service: UserService,
}

impl AppState {
    /// Wire up every collaborator from configuration.
    ///
    /// # Errors
    ///
    /// Returns `GatekeeperError::Crypto` if the bcrypt cost is rejected.
    pub fn new(config: Config) -> Result<Self, GatekeeperError> {
        let cors = CorsPolicy::from_origin_list(&config.cors_allowed_origins)
            .with_max_age(Duration::from_secs(config.cors_max_age_seconds));
        let encoder = PasswordEncoder::new(config.bcrypt_cost)?;
        let user_service =
            UserService::new(UserStore::new(), encoder, JwtIssuer::from_config(&config))?;

        Ok(Self {
            policy: Arc::new(AccessPolicy::default_rules()),
            cors,
            jwt_validator: Arc::new(JwtValidator::from_config(&config)),
            user_service,
            config,
        })
    }
}

/// Build the public router.
///
/// - `/` - service banner
/// - `/api/health` - liveness
/// - `/api/auth/register`, `/api/auth/login` - account endpoints
/// - `/api/user/me` - current identity
///
/// Every route, and the 404 fallback, sits behind the [`SecurityFilterChain`].
pub fn build_routes(state: Arc<AppState>) -> Router {
    let chain = SecurityFilterChain::new(
        state.policy.clone(),
        state.cors.clone(),
        state.jwt_validator.clone(),
    );

    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health_check))
        .route("/api/auth/register", post(handlers::handle_register))
        .route("/api/auth/login", post(handlers::handle_login))
        .route("/api/user/me", get(handlers::current_user))
        .with_state(state);

    chain.apply(router)
}

/// Router for the metrics listener.
pub fn build_metrics_routes(metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle)
}
