//! Public operational endpoints.

use gatekeeper_test_utils::TestGatekeeperServer;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_returns_up() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, serde_json::json!({"status": "UP"}));

    Ok(())
}

#[tokio::test]
async fn test_root_is_public() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await?.contains("gatekeeper"));

    Ok(())
}

/// A stale or garbage token must not break public endpoints.
#[tokio::test]
async fn test_health_ignores_invalid_token() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/health", server.url()))
        .bearer_auth("not-a-jwt")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_metrics_not_exposed_on_public_listener() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    // Unknown path for an anonymous caller
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
