//! Route access rules enforced end to end.

use gatekeeper_test_utils::{TestGatekeeperServer, TestTokenBuilder};
use reqwest::{header, Method, StatusCode};

// ============================================================================
// Public routes
// ============================================================================

/// Public GET on movies passes the gatekeeper; there is no movie handler
/// behind it, so the router answers 404 rather than 401.
#[tokio::test]
async fn test_get_movies_is_public() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/movies/123", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_write_to_movies_requires_auth() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let client = reqwest::Client::new();

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let response = client
            .request(method.clone(), format!("{}/api/movies/123", server.url()))
            .send()
            .await?;

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} /api/movies/123 should require authentication",
            method
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_options_is_never_rejected() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let client = reqwest::Client::new();

    for path in ["/api/user/me", "/api/media/1", "/api/groups", "/nowhere"] {
        let response = client
            .request(Method::OPTIONS, format!("{}{}", server.url(), path))
            .send()
            .await?;

        assert_ne!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "OPTIONS {} should not be rejected by the gatekeeper",
            path
        );
    }

    Ok(())
}

// ============================================================================
// Protected routes
// ============================================================================

#[tokio::test]
async fn test_protected_prefixes_require_auth() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let client = reqwest::Client::new();

    for path in [
        "/api/user/profile",
        "/api/logs/recent",
        "/api/groups/7",
        "/api/media/watchlist",
    ] {
        let response = client
            .get(format!("{}{}", server.url(), path))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
        assert_eq!(
            response
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer")
        );

        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    Ok(())
}

#[tokio::test]
async fn test_valid_token_reaches_handler() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .for_user("switch")
        .with_subject("7f1c2b9e-0000-4000-8000-000000000042")
        .with_role("curator")
        .sign();

    let response = reqwest::Client::new()
        .get(format!("{}/api/user/me", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["username"], "switch");
    assert_eq!(body["user_id"], "7f1c2b9e-0000-4000-8000-000000000042");
    assert_eq!(body["roles"], serde_json::json!(["user", "curator"]));

    Ok(())
}

#[tokio::test]
async fn test_expired_token_rejected() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let token = TestTokenBuilder::new().expires_in(-60).sign();

    let response = reqwest::Client::new()
        .get(format!("{}/api/user/me", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");

    Ok(())
}

/// `iat` an hour ahead is beyond the default five minute skew.
#[tokio::test]
async fn test_future_issued_token_rejected() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let now = chrono::Utc::now().timestamp();
    let token = TestTokenBuilder::new()
        .issued_at(now + 3600)
        .expires_in(7200)
        .sign();

    let response = reqwest::Client::new()
        .get(format!("{}/api/user/me", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");

    Ok(())
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let token = TestTokenBuilder::new().sign_with(b"some-other-secret-of-32-bytes!!!");

    let response = reqwest::Client::new()
        .get(format!("{}/api/user/me", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_oversized_token_rejected_only_where_protected() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let client = reqwest::Client::new();
    let oversized = "a".repeat(10 * 1024);

    let response = client
        .get(format!("{}/api/user/me", server.url()))
        .bearer_auth(&oversized)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/api/health", server.url()))
        .bearer_auth(&oversized)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let token = TestTokenBuilder::new().sign();

    let response = reqwest::Client::new()
        .get(format!("{}/api/user/me", server.url()))
        .header(header::AUTHORIZATION, format!("Basic {}", token))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

// ============================================================================
// Default deny
// ============================================================================

#[tokio::test]
async fn test_unknown_route_anonymous_gets_401() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/admin/users", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_authenticated_gets_404() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    let token = TestTokenBuilder::new().sign();

    let response = reqwest::Client::new()
        .get(format!("{}/api/admin/users", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
