//! Signup, login, and the current-user endpoint.
//!
//! Registration writes three rows (company, role, user) without a
//! cross-backend transaction; on a later failure the earlier rows are
//! removed best-effort, and the unique email checks make a retry safe.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use store::{Filter, Row, RowStore};
use uuid::Uuid;

use crate::auth::{issue_token, verify_password, Identity};
use crate::entities::{companies, roles, users, ApiEntity};
use crate::error::{ApiError, ApiResult, FieldError};
use crate::repo::{now_rfc3339, Repository};
use crate::routes::Payload;
use crate::state::AppState;
use crate::validate::{email_error, phone_error, WriteMode};

const REGISTER_REQUIRED: &[&str] = &[
    "companyName",
    "firstName",
    "lastName",
    "email",
    "phoneNumber",
    "password",
];

const COMPANY_FIELDS: &[&str] = &[
    "companyName",
    "firstName",
    "lastName",
    "email",
    "phoneNumber",
    "address",
    "city",
    "zipCode",
    "country",
    "website",
    "industry",
    "companySize",
];

fn copy_fields(body: &Row, names: &[&str]) -> Row {
    let mut out = Row::new();
    for name in names {
        if let Some(value) = body.get(*name).filter(|v| !v.is_null()) {
            out.insert(name.to_string(), value.clone());
        }
    }
    out
}

fn register_errors(body: &Row) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for field in REGISTER_REQUIRED {
        let missing = body
            .get(*field)
            .and_then(Value::as_str)
            .is_none_or(|s| s.trim().is_empty());
        if missing {
            errors.push(FieldError::new(*field, format!("{field} is required")));
            continue;
        }
    }
    if let Some(email) = body.get("email").and_then(Value::as_str) {
        if let Some(message) = email_error(email) {
            errors.push(FieldError::new("email", message));
        }
    }
    if let Some(phone) = body.get("phoneNumber").and_then(Value::as_str) {
        if let Some(message) = phone_error(phone) {
            errors.push(FieldError::new("phoneNumber", message));
        }
    }
    if let Some(password) = body.get("password").and_then(Value::as_str) {
        if password.len() < 8 {
            errors.push(FieldError::new("password", "must be at least 8 characters"));
        }
    }
    errors
}

/// Best-effort removal of a row written before a later signup step failed.
async fn compensate(store: &dyn RowStore, table: &str, id: &str) {
    let filter = Filter::new().eq("id", id);
    if let Err(err) = store.delete(table, &filter).await {
        tracing::error!(table, id, error = %err, "failed to roll back partial signup");
    }
}

fn row_id(row: &Row) -> ApiResult<String> {
    row.get("id")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ApiError::Storage("created row is missing an id".to_string()))
}

pub async fn register(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let errors = register_errors(&body);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let email = body["email"].as_str().unwrap_or_default().trim().to_string();

    let companies_repo = Repository::new(state.store.clone(), &companies::SCHEMA);
    let users_repo = Repository::new(state.store.clone(), &users::SCHEMA);

    // Friendlier duplicate messages than a raw unique-key bounce; the
    // indexes still backstop a race.
    if companies_repo
        .find_one_global("email", &email)
        .await?
        .is_some()
    {
        return Err(ApiError::Duplicate(
            "A company with this email already exists".to_string(),
        ));
    }
    if users_repo.find_one_global("email", &email).await?.is_some() {
        return Err(ApiError::Duplicate(
            "A user with this email already exists".to_string(),
        ));
    }

    let company = companies_repo
        .create(None, copy_fields(&body, COMPANY_FIELDS))
        .await?;
    let company_id_text = row_id(&company)?;
    let company_id = Uuid::parse_str(&company_id_text).map_err(ApiError::storage)?;

    let roles_repo = Repository::new(state.store.clone(), &roles::SCHEMA);
    let role = match roles_repo
        .create(Some(company_id), roles::super_admin_fields())
        .await
    {
        Ok(role) => role,
        Err(err) => {
            compensate(state.store.as_ref(), companies::SCHEMA.table, &company_id_text).await;
            return Err(err);
        }
    };
    let role_id = row_id(&role)?;

    let mut user_fields = copy_fields(
        &body,
        &["email", "password", "firstName", "lastName", "phoneNumber"],
    );
    user_fields.insert("roleId".to_string(), Value::String(role_id.clone()));
    user_fields.insert("department".to_string(), Value::from("Management"));
    user_fields.insert("position".to_string(), Value::from("Super Admin"));
    users::Users::prepare(&mut user_fields, WriteMode::Create)?;

    let user = match users_repo.create(Some(company_id), user_fields).await {
        Ok(user) => user,
        Err(err) => {
            compensate(state.store.as_ref(), roles::SCHEMA.table, &role_id).await;
            compensate(state.store.as_ref(), companies::SCHEMA.table, &company_id_text).await;
            return Err(err);
        }
    };
    let user_id = Uuid::parse_str(&row_id(&user)?).map_err(ApiError::storage)?;

    let token = issue_token(user_id, company_id, &state.auth)?;
    tracing::info!(company = %company_id, user = %user_id, "tenant registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "data": { "token": token, "user": user, "company": company },
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> ApiResult<Json<Value>> {
    let mut errors = Vec::new();
    for field in ["email", "password"] {
        if body
            .get(field)
            .and_then(Value::as_str)
            .is_none_or(|s| s.trim().is_empty())
        {
            errors.push(FieldError::new(field, format!("{field} is required")));
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let email = body["email"].as_str().unwrap_or_default().trim();
    let password = body["password"].as_str().unwrap_or_default();

    let invalid = || ApiError::Auth("Invalid email or password".to_string());
    let users_repo = Repository::new(state.store.clone(), &users::SCHEMA);
    let user = users_repo
        .find_one_global("email", email)
        .await?
        .ok_or_else(invalid)?;

    let hash = user
        .get("password_hash")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Storage("user row is missing a password hash".to_string()))?;
    if !verify_password(password, hash) {
        return Err(invalid());
    }

    let user_id = user
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ApiError::Storage("user row has a malformed id".to_string()))?;
    let company_id = user
        .get("company_id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ApiError::Storage("user row has a malformed company id".to_string()))?;

    let mut stamp = Row::new();
    stamp.insert("last_login_at".to_string(), Value::from(now_rfc3339()));
    let refreshed = state
        .store
        .update(
            users::SCHEMA.table,
            &Filter::new().eq("id", user_id.to_string()),
            stamp,
        )
        .await
        .map_err(ApiError::from)?
        .unwrap_or(user);

    let token = issue_token(user_id, company_id, &state.auth)?;
    let presented = users_repo.present(refreshed);

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": { "token": token, "user": presented },
    })))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Value>> {
    let repo = Repository::new(state.store.clone(), &users::SCHEMA);
    let user = repo
        .find_by_id_for_tenant(&identity.user_id.to_string(), identity.company_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "User retrieved successfully",
        "data": { "user": user },
    })))
}
