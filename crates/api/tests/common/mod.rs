use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use migration::{Migrator, MigratorTrait};
use serde_json::{json, Value};
use tower::ServiceExt;

use api::auth::AuthConfig;
use api::{build_router, AppState};

/// A full router over a fresh in-memory SQLite database.
pub async fn test_app() -> Router {
    let sql = store::SqlStore::connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    Migrator::up(sql.connection(), None).await.expect("migrate");
    let state = AppState {
        store: Arc::new(sql),
        auth: Arc::new(AuthConfig::new("test-secret")),
    };
    build_router(state)
}

pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };
    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse json body")
    };
    (status, value)
}

/// Register a tenant and return its bearer token plus the registration data
/// (`token`, `user`, `company`).
pub async fn register_tenant(app: &Router, company: &str, email: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "companyName": company,
            "firstName": "Pat",
            "lastName": "Lee",
            "email": email,
            "phoneNumber": "+15550001111",
            "password": "s3cret-pass",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    let token = body["data"]["token"]
        .as_str()
        .expect("token in registration response")
        .to_string();
    (token, body["data"].clone())
}
