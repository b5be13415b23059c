//! Authentication boundary tests
//!
//! Requests here are rejected before any query runs, so no database is
//! needed.

mod common;

use axum::http::{Method, StatusCode};
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn test_missing_token_is_401_on_every_domain() {
    let app = TestApp::without_database().unwrap();
    for path in [
        "/v1/properties",
        "/v1/property-groups",
        "/v1/favorites",
        "/v1/tenant/property",
        "/v1/account",
        "/v1/team-members",
        "/v1/invitations",
        "/v1/notifications",
        "/v1/tasks",
        "/v1/maintenance-requests",
    ] {
        let (status, body) = app.send(Method::GET, path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", path);
        assert!(body["error"]["code"].is_string(), "{}: {}", path, body);
    }
}

#[tokio::test]
async fn test_garbage_token_is_401() {
    let app = TestApp::without_database().unwrap();
    let (status, _) = app
        .send(Method::GET, "/v1/tasks", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_401() {
    let app = TestApp::without_database().unwrap();
    let mut config = app.config.clone();
    config.jwt_secret = "some-other-secret".to_string();
    let other = TestApp::with_config(config).unwrap();
    let token = other
        .token_for(Uuid::new_v4(), "someone@example.com")
        .unwrap();

    let (status, _) = app
        .send(
            Method::POST,
            "/v1/tasks/00000000-0000-0000-0000-000000000001/approve",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_endpoints_need_no_token() {
    let app = TestApp::without_database().unwrap();
    let (status, _) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::GET, "/v1/app/version", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "0.1.0");
}

#[tokio::test]
#[ignore = "requires a database"]
async fn test_new_subject_with_registered_email_is_409() {
    let app = TestApp::new().await.unwrap();
    let existing = app.create_user("tenant").await.unwrap();
    let token = app
        .token_for(Uuid::new_v4(), &existing.email.to_uppercase())
        .unwrap();

    let (status, body) = app
        .send(Method::GET, "/v1/account", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "EMAIL_IN_USE");
}
