//! Cross-origin behavior of the running server.

use gatekeeper_test_utils::{TestGatekeeperServer, TEST_ALLOWED_ORIGIN};
use reqwest::{header, Method, StatusCode};

async fn preflight(
    server: &TestGatekeeperServer,
    path: &str,
    origin: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .request(Method::OPTIONS, format!("{}{}", server.url(), path))
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .send()
        .await?)
}

fn allow_origin(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_preflight_to_protected_route_without_token() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = preflight(&server, "/api/user/me", TEST_ALLOWED_ORIGIN).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(allow_origin(&response), Some(TEST_ALLOWED_ORIGIN));
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_MAX_AGE)
        .is_some());

    Ok(())
}

#[tokio::test]
async fn test_preflight_from_unlisted_origin() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = preflight(&server, "/api/health", "http://evil.example").await?;

    assert_eq!(allow_origin(&response), None);

    Ok(())
}

#[tokio::test]
async fn test_configured_list_allows_each_origin() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn_with_origins("http://a.com, http://b.com").await?;

    for origin in ["http://a.com", "http://b.com"] {
        let response = preflight(&server, "/api/health", origin).await?;
        assert_eq!(allow_origin(&response), Some(origin));
    }
    let response = preflight(&server, "/api/health", "http://c.com").await?;
    assert_eq!(allow_origin(&response), None);

    Ok(())
}

#[tokio::test]
async fn test_empty_origin_list_allows_nothing() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn_with_origins("").await?;

    let response = preflight(&server, "/api/health", TEST_ALLOWED_ORIGIN).await?;

    assert_eq!(allow_origin(&response), None);

    Ok(())
}

/// Browsers need the CORS headers on error responses to surface the 401.
#[tokio::test]
async fn test_unauthorized_response_carries_cors_headers() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/user/me", server.url()))
        .header(header::ORIGIN, TEST_ALLOWED_ORIGIN)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(allow_origin(&response), Some(TEST_ALLOWED_ORIGIN));

    Ok(())
}
