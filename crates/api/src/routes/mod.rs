//! Router assembly and shared extractors. All application routes live under
//! `/api`; everything except health and the auth entry points requires a
//! bearer token.

mod auth;
mod company;
mod crud;
mod tasks;

use axum::extract::{FromRequest, Request};
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use store::Row;

use crate::entities::{
    cases::Cases, customers::Customers, events::Events, opportunities::Opportunities,
    users::Users, work_orders::WorkOrders,
};
use crate::error::{ApiError, FieldError};
use crate::repo::now_rfc3339;
use crate::state::AppState;

/// JSON object request body. Rejects non-object bodies with the same
/// envelope as field validation failures.
pub struct Payload(pub Row);

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|err| {
                ApiError::Validation(vec![FieldError::new("body", err.body_text())])
            })?;
        match value {
            Value::Object(map) => Ok(Payload(map)),
            _ => Err(ApiError::Validation(vec![FieldError::new(
                "body",
                "request body must be a JSON object",
            )])),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/customers", crud::entity_routes::<Customers>())
        .nest("/tasks", tasks::routes())
        .nest("/opportunities", crud::entity_routes::<Opportunities>())
        .nest("/workorders", crud::entity_routes::<WorkOrders>())
        .nest("/cases", crud::entity_routes::<Cases>())
        .nest("/events", crud::entity_routes::<Events>())
        .nest("/users", crud::entity_routes::<Users>())
        .route("/company", get(company::show).put(company::update))
        .route("/auth/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_identity,
        ));

    let api = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected);

    Router::new().nest("/api", api).with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "CRM API is running",
        "timestamp": now_rfc3339(),
    }))
}
