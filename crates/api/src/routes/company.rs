//! The tenant's own company record. The id always comes from the token, so
//! there is no cross-tenant read or write to defend against here.

use axum::extract::State;
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::auth::Identity;
use crate::entities::companies;
use crate::error::ApiResult;
use crate::repo::Repository;
use crate::routes::Payload;
use crate::state::AppState;
use crate::validate::{self, WriteMode};

fn repository(state: &AppState) -> Repository {
    Repository::new(state.store.clone(), &companies::SCHEMA)
}

pub async fn show(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Value>> {
    let row = repository(&state)
        .find_by_id_for_tenant(&identity.company_id.to_string(), identity.company_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Company retrieved successfully",
        "data": row,
    })))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Payload(fields): Payload,
) -> ApiResult<Json<Value>> {
    let errors = validate::validate(&companies::SCHEMA, &fields, WriteMode::Update);
    if !errors.is_empty() {
        return Err(crate::error::ApiError::Validation(errors));
    }
    let row = repository(&state)
        .update_for_tenant(&identity.company_id.to_string(), identity.company_id, fields)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Company updated successfully",
        "data": row,
    })))
}
