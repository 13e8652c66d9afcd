mod common;

use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use reqwest::header;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app.register("a@x.com", "secret1").await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["token_type"], "bearer");
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["expires_at"].is_string());
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_assigns_sequential_ids() {
    let app = TestApp::spawn().await;

    let first: serde_json::Value = app.register("a@x.com", "secret1").await.json().await.unwrap();
    let second: serde_json::Value = app.register("b@x.com", "secret2").await.json().await.unwrap();

    assert_eq!(first["data"]["id"], 1);
    assert_eq!(second["data"]["id"], 2);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register("a@x.com", "secret1").await;
    let response = app.register("a@x.com", "another1").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The original password still logs in
    let response = app.login("a@x.com", "secret1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.login("a@x.com", "another1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_short_password() {
    let app = TestApp::spawn().await;

    let response = app.register("a@x.com", "12345").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was stored
    let response = app.login("a@x.com", "12345").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app.register("not-an-email", "secret1").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_missing_field() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/register")
        .json(&json!({ "email": "a@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 422);
    assert!(body["data"]["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_register_malformed_json() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "secret1").await;

    let response = app.login("a@x.com", "secret1").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["token_type"], "bearer");
    assert!(body["data"]["token"].is_string());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "secret1").await;

    let wrong_password = app.login("a@x.com", "wrong-password").await;
    let unknown_email = app.login("nobody@x.com", "secret1").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password: serde_json::Value = wrong_password.json().await.unwrap();
    let unknown_email: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["data"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_missing_field() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/login")
        .json(&json!({ "password": "secret1" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_full_session_flow() {
    let app = TestApp::spawn().await;

    let response = app.register("a@x.com", "secret1").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.unwrap();
    let first_token = body["data"]["token"].as_str().unwrap().to_string();

    let second_token = app.login_token("a@x.com", "secret1").await;
    assert_ne!(first_token, second_token);

    let response = app
        .get_authenticated("/user/me", &second_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["email"], "a@x.com");

    // The registration token stays valid alongside the login token
    let response = app
        .get_authenticated("/user/me", &first_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_without_header() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/user/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["data"]["message"],
        "Authentication token missing or malformed"
    );
}

#[tokio::test]
async fn test_me_with_wrong_scheme() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "secret1").await;
    let token = app.login_token("a@x.com", "secret1").await;

    let response = app
        .get("/user/me")
        .header(header::AUTHORIZATION, format!("Token {}", token))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["data"]["message"],
        "Authentication token missing or malformed"
    );
}

#[tokio::test]
async fn test_me_with_garbage_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated("/user/me", "garbage")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_me_with_expired_token() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "secret1").await;

    let expired = app
        .authenticator
        .issue_token_at(1, "a@x.com", Utc::now() - Duration::hours(2))
        .expect("Failed to issue token");

    let response = app
        .get_authenticated("/user/me", &expired.access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_me_with_token_from_other_secret() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "secret1").await;

    let forger = auth::Authenticator::new(
        b"some-other-secret-that-is-at-least-32-bytes",
        Duration::hours(1),
    );
    let forged = forger.issue_token(1, "a@x.com").unwrap();

    let response = app
        .get_authenticated("/user/me", &forged.access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_for_unknown_identity() {
    let app = TestApp::spawn().await;

    // Validly signed, but nobody with this id was ever registered
    let token = app.authenticator.issue_token(42, "ghost@x.com").unwrap();

    let response = app
        .get_authenticated("/user/me", &token.access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
