//! Test server harness for E2E testing
//!
//! Provides `TestGatekeeperServer` for spawning real gatekeeper instances in
//! tests.

use crate::fixtures::{test_config, test_config_with_origins};
use common::secret::SecretString;
use gatekeeper::config::Config;
use gatekeeper::observability::metrics::init_metrics_recorder;
use gatekeeper::routes::{self, AppState};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the gatekeeper in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() -> Result<(), anyhow::Error> {
///     let server = TestGatekeeperServer::spawn().await?;
///     let response = reqwest::get(format!("{}/api/health", server.url())).await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestGatekeeperServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    handle: JoinHandle<()>,
}

impl TestGatekeeperServer {
    /// Spawn with [`test_config`].
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(test_config()).await
    }

    /// Spawn with a specific comma-separated CORS origin list.
    pub async fn spawn_with_origins(origins: &str) -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(test_config_with_origins(origins)).await
    }

    /// The server binds to a random port on 127.0.0.1 and serves in the
    /// background until dropped.
    pub async fn spawn_with_config(config: Config) -> Result<Self, anyhow::Error> {
        let state = Arc::new(
            AppState::new(config)
                .map_err(|e| anyhow::anyhow!("Failed to build application state: {}", e))?,
        );

        // Only one recorder can be installed per process. Later servers get a
        // standalone recorder that is never installed globally.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => PrometheusBuilder::new().build_recorder().handle(),
        };

        let app = routes::build_routes(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            metrics_handle,
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Rendered Prometheus exposition.
    ///
    /// Only the first server spawned in a test process owns the global
    /// recorder; later servers render an empty exposition.
    pub fn render_metrics(&self) -> String {
        self.metrics_handle.render()
    }

    /// Register an account directly through the service layer and return its
    /// access token.
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, anyhow::Error> {
        let registered = self
            .state
            .user_service
            .register(username, &SecretString::from(password))
            .await?;
        Ok(registered.access_token)
    }
}

impl Drop for TestGatekeeperServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
