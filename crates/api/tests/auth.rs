mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{register_tenant, send, test_app};

#[tokio::test]
async fn health_is_open() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn register_creates_company_role_and_user() {
    let app = test_app().await;
    let (_, data) = register_tenant(&app, "Acme", "owner@acme.test").await;

    assert_eq!(data["company"]["companyName"], json!("Acme"));
    assert_eq!(data["user"]["email"], json!("owner@acme.test"));
    assert_eq!(data["user"]["position"], json!("Super Admin"));
    assert_eq!(data["user"]["isActive"], json!(true));
    assert!(data["user"]["roleId"].is_string());
    assert_eq!(data["user"]["companyId"], data["company"]["id"]);
    // the hash never leaves the server
    assert!(data["user"].get("passwordHash").is_none());
    assert!(data["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "companyName": "Acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Validation errors"));
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"phoneNumber"));
}

#[tokio::test]
async fn register_rejects_duplicate_company_email() {
    let app = test_app().await;
    register_tenant(&app, "Acme", "owner@acme.test").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "companyName": "Acme Two",
            "firstName": "Sam",
            "lastName": "Roe",
            "email": "owner@acme.test",
            "phoneNumber": "+15550002222",
            "password": "another-pass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("A company with this email already exists")
    );
}

#[tokio::test]
async fn login_succeeds_and_stamps_last_login() {
    let app = test_app().await;
    register_tenant(&app, "Acme", "owner@acme.test").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "owner@acme.test", "password": "s3cret-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["user"]["lastLoginAt"].is_string());
    assert!(body["data"]["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = test_app().await;
    register_tenant(&app, "Acme", "owner@acme.test").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "owner@acme.test", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid email or password"));

    // unknown email gets the same answer
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@acme.test", "password": "s3cret-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid email or password"));
}

#[tokio::test]
async fn me_returns_current_user() {
    let app = test_app().await;
    let (token, data) = register_tenant(&app, "Acme", "owner@acme.test").await;
    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], data["user"]["id"]);
    assert_eq!(body["data"]["user"]["email"], json!("owner@acme.test"));
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/customers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("No token provided"));

    let (status, body) = send(&app, "GET", "/api/customers", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid or expired token"));
}

#[tokio::test]
async fn demo_token_is_rejected_unless_enabled() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "GET",
        "/api/customers",
        Some("header.demo_signature.tail"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivated_user_loses_access() {
    let app = test_app().await;
    let (token, data) = register_tenant(&app, "Acme", "owner@acme.test").await;
    let user_id = data["user"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/users/{user_id}"),
        Some(&token),
        Some(json!({ "isActive": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/customers", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Account is inactive"));
}
