use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::Value;
use store::{Direction, OrderBy};

use crate::auth::Identity;
use crate::entities::tasks::Tasks;
use crate::entities::ApiEntity;
use crate::error::ApiResult;
use crate::repo::{now_rfc3339, Repository};
use crate::routes::crud;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    // Static segment registered alongside the `{id}` capture; the router
    // prefers the static match.
    crud::entity_routes::<Tasks>().route("/overdue", get(overdue))
}

/// Pending tasks whose due date has passed, soonest first. Due dates are
/// stored as RFC 3339 text, so the lexicographic comparison is a time
/// comparison.
async fn overdue(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Value>> {
    let repo = Repository::new(state.store.clone(), Tasks::schema());
    let filter = repo
        .tenant_filter(identity.company_id)
        .eq("status", "pending")
        .lt("due_date", now_rfc3339());
    let order = OrderBy { column: "due_date", direction: Direction::Asc };
    let rows = repo.find_filtered(filter, Some(&order)).await?;
    Ok(crud::collection(
        "Overdue tasks retrieved successfully".to_string(),
        rows,
    ))
}
