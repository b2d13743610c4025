mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{register_tenant, send, test_app};

#[tokio::test]
async fn create_applies_defaults_and_stamps_creator() {
    let app = test_app().await;
    let (token, data) = register_tenant(&app, "Acme", "a@acme.test").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "mobileNumber": "+15550100001",
            "email": "ada@example.test",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], json!("Customer created successfully"));
    assert_eq!(body["data"]["status"], json!("active"));
    assert_eq!(body["data"]["createdBy"], data["user"]["id"]);
    assert!(body["data"]["createdAt"].is_string());
    assert_eq!(body["data"]["createdAt"], body["data"]["updatedAt"]);
}

#[tokio::test]
async fn create_collects_all_validation_failures() {
    let app = test_app().await;
    let (token, _) = register_tenant(&app, "Acme", "a@acme.test").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({
            "email": "bad-email",
            "status": "vip",
            "dateOfBirth": "01/02/1990",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"firstName"));
    assert!(fields.contains(&"lastName"));
    assert!(fields.contains(&"mobileNumber"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"status"));
    assert!(fields.contains(&"dateOfBirth"));
}

#[tokio::test]
async fn duplicate_mobile_number_is_a_friendly_400() {
    let app = test_app().await;
    let (token, _) = register_tenant(&app, "Acme", "a@acme.test").await;
    let payload = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "mobileNumber": "+15550100001",
    });
    let (status, _) = send(&app, "POST", "/api/customers", Some(&token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/customers", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("A customer with this mobile number already exists")
    );
}

#[tokio::test]
async fn update_is_partial_and_bumps_updated_at() {
    let app = test_app().await;
    let (token, _) = register_tenant(&app, "Acme", "a@acme.test").await;
    let (_, created) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "mobileNumber": "+15550100001",
            "city": "London",
        })),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/customers/{id}"),
        Some(&token),
        Some(json!({ "city": "Cambridge" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], json!("Cambridge"));
    assert_eq!(body["data"]["firstName"], json!("Ada"));
    let created_at = body["data"]["createdAt"].as_str().unwrap();
    let updated_at = body["data"]["updatedAt"].as_str().unwrap();
    assert!(updated_at >= created_at);
}

#[tokio::test]
async fn repeating_an_update_changes_nothing() {
    let app = test_app().await;
    let (token, _) = register_tenant(&app, "Acme", "a@acme.test").await;
    let (_, created) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "mobileNumber": "+15550100001",
            "city": "London",
        })),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let payload = json!({ "city": "Cambridge", "notes": "prefers email" });
    let (status, first) = send(
        &app,
        "PUT",
        &format!("/api/customers/{id}"),
        Some(&token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = send(
        &app,
        "PUT",
        &format!("/api/customers/{id}"),
        Some(&token),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // same final state apart from the refreshed updatedAt stamp
    let mut a = first["data"].as_object().unwrap().clone();
    let mut b = second["data"].as_object().unwrap().clone();
    a.remove("updatedAt");
    b.remove("updatedAt");
    assert_eq!(a, b);
}

#[tokio::test]
async fn explicit_null_clears_a_text_field() {
    let app = test_app().await;
    let (token, _) = register_tenant(&app, "Acme", "a@acme.test").await;
    let (_, created) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "mobileNumber": "+15550100001",
            "notes": "keep an eye on this one",
        })),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/customers/{id}"),
        Some(&token),
        Some(json!({ "notes": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["notes"].is_null());
}

#[tokio::test]
async fn delete_then_fetch_is_not_found() {
    let app = test_app().await;
    let (token, _) = register_tenant(&app, "Acme", "a@acme.test").await;
    let (_, created) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&token),
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "mobileNumber": "+15550100001",
        })),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/customers/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Customer deleted successfully"));

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/customers/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/customers/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
