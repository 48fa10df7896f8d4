//! Registration and login through the HTTP surface.

use gatekeeper_test_utils::TestGatekeeperServer;
use reqwest::{header, StatusCode};
use serde_json::json;

async fn register(
    server: &TestGatekeeperServer,
    username: &str,
    password: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}/api/auth/register", server.url()))
        .json(&json!({"username": username, "password": password}))
        .send()
        .await?)
}

async fn login(
    server: &TestGatekeeperServer,
    username: &str,
    password: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}/api/auth/login", server.url()))
        .json(&json!({"username": username, "password": password}))
        .send()
        .await?)
}

#[tokio::test]
async fn test_register_login_and_fetch_identity() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = register(&server, "trinity", "follow-the-rabbit").await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered: serde_json::Value = response.json().await?;
    assert_eq!(registered["username"], "trinity");
    assert_eq!(registered["token_type"], "Bearer");
    assert!(registered.get("password").is_none());

    let response = login(&server, "trinity", "follow-the-rabbit").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let token: serde_json::Value = response.json().await?;
    let access_token = token["access_token"].as_str().unwrap_or_default();
    assert_eq!(access_token.split('.').count(), 3);

    let response = reqwest::Client::new()
        .get(format!("{}/api/user/me", server.url()))
        .bearer_auth(access_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let me: serde_json::Value = response.json().await?;
    assert_eq!(me["username"], "trinity");
    assert_eq!(me["user_id"], registered["user_id"]);
    assert_eq!(me["roles"], json!(["user"]));

    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    server.register_user("cypher", "steak-is-real").await?;

    let response = login(&server, "cypher", "steak-is-fake").await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_some());
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

    Ok(())
}

/// Unknown users and wrong passwords are indistinguishable.
#[tokio::test]
async fn test_login_unknown_user_same_error() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = login(&server, "agent-smith", "whatever-pass").await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["error"]["message"], "Invalid username or password");

    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_conflicts() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;
    server.register_user("oracle", "cookies-please").await?;

    let response = register(&server, "Oracle", "cookies-please").await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_short_password() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = register(&server, "apoc", "short").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_bad_username() -> Result<(), anyhow::Error> {
    let server = TestGatekeeperServer::spawn().await?;

    let response = register(&server, "dozer tank", "long-enough-pass").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
