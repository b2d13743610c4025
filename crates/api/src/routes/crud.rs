//! The generic CRUD surface: one set of handlers instantiated per entity.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use store::Row;

use crate::auth::Identity;
use crate::entities::ApiEntity;
use crate::error::{ApiError, ApiResult};
use crate::repo::Repository;
use crate::routes::Payload;
use crate::state::AppState;
use crate::validate::{self, WriteMode};

pub fn entity_routes<E: ApiEntity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<E>).post(create::<E>))
        .route("/search", get(search::<E>))
        .route("/{id}", get(show::<E>).put(update::<E>).delete(remove::<E>))
}

fn repository<E: ApiEntity>(state: &AppState) -> Repository {
    Repository::new(state.store.clone(), E::schema())
}

pub(crate) fn collection(message: String, rows: Vec<Row>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message,
        "count": rows.len(),
        "data": rows,
    }))
}

fn single(message: String, row: Row) -> Json<Value> {
    Json(json!({ "success": true, "message": message, "data": row }))
}

/// Validate, run the entity hook, and stamp `createdBy` where the schema
/// has one.
fn prepare_write<E: ApiEntity>(
    identity: &Identity,
    mut fields: Row,
    mode: WriteMode,
) -> ApiResult<Row> {
    let schema = E::schema();
    let errors = validate::validate(schema, &fields, mode);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    validate::normalize(schema, &mut fields);
    E::prepare(&mut fields, mode)?;
    if mode == WriteMode::Create && schema.has_field("createdBy") {
        fields.insert(
            "createdBy".to_string(),
            Value::String(identity.user_id.to_string()),
        );
    }
    Ok(fields)
}

async fn list<E: ApiEntity>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Value>> {
    let rows = repository::<E>(&state)
        .find_all_for_tenant(identity.company_id)
        .await?;
    Ok(collection(
        format!("{} retrieved successfully", E::schema().plural),
        rows,
    ))
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search<E: ApiEntity>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Value>> {
    let query = params.q.unwrap_or_default();
    let rows = repository::<E>(&state)
        .search(identity.company_id, &query)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Search completed successfully",
        "query": query.trim(),
        "count": rows.len(),
        "data": rows,
    })))
}

async fn show<E: ApiEntity>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let row = repository::<E>(&state)
        .find_by_id_for_tenant(&id, identity.company_id)
        .await?;
    Ok(single(
        format!("{} retrieved successfully", E::schema().singular),
        row,
    ))
}

async fn create<E: ApiEntity>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Payload(fields): Payload,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let fields = prepare_write::<E>(&identity, fields, WriteMode::Create)?;
    let row = repository::<E>(&state)
        .create(Some(identity.company_id), fields)
        .await?;
    Ok((
        StatusCode::CREATED,
        single(format!("{} created successfully", E::schema().singular), row),
    ))
}

async fn update<E: ApiEntity>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Payload(fields): Payload,
) -> ApiResult<Json<Value>> {
    let fields = prepare_write::<E>(&identity, fields, WriteMode::Update)?;
    let row = repository::<E>(&state)
        .update_for_tenant(&id, identity.company_id, fields)
        .await?;
    Ok(single(
        format!("{} updated successfully", E::schema().singular),
        row,
    ))
}

async fn remove<E: ApiEntity>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    repository::<E>(&state)
        .delete_for_tenant(&id, identity.company_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{} deleted successfully", E::schema().singular),
    })))
}
