use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use levelr_core::models::{Goal, SaveGoalInput};
use levelr_core::progression::check_progression;
use levelr_core::CompletionOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiError, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/goals", get(list_goals).post(save_goal))
        .route("/api/goals/{id}", get(get_goal).delete(delete_goal))
        .route(
            "/api/goals/{id}/levels/{level}/tasks/{index}",
            put(toggle_task),
        )
        .route("/api/goals/{id}/levels/{level}/complete", post(complete_level))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsQuery {
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

async fn list_goals(
    State(state): State<AppState>,
    Query(query): Query<GoalsQuery>,
) -> ApiResult<Json<Vec<Goal>>> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("userId required"))?;
    let user_id =
        Uuid::parse_str(user_id.trim()).map_err(|_| ApiError::bad_request("Invalid userId"))?;

    Ok(Json(state.db.list_goals(user_id)?))
}

async fn get_goal(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Goal>> {
    state
        .db
        .get_goal(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Goal not found"))
}

/// Replace-or-insert when an id is given, create otherwise.
async fn save_goal(
    State(state): State<AppState>,
    Json(input): Json<SaveGoalInput>,
) -> ApiResult<Json<Goal>> {
    if state.db.get_user(input.user_id)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let goal = input.into_goal();
    if let Err(e) = check_progression(&goal) {
        tracing::warn!(goal_id = %goal.id, "Saving goal with {}", e);
    }
    state.db.upsert_goal(&goal)?;
    Ok(Json(goal))
}

async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if state.db.delete_goal(id)? {
        tracing::info!(goal_id = %id, "Goal deleted");
    }
    Ok(Json(MessageResponse { message: "Deleted" }))
}

async fn toggle_task(
    State(state): State<AppState>,
    Path((id, level, index)): Path<(Uuid, u32, usize)>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.db.toggle_task(id, level, index)?))
}

async fn complete_level(
    State(state): State<AppState>,
    Path((id, level)): Path<(Uuid, u32)>,
) -> ApiResult<Json<CompletionOutcome>> {
    Ok(Json(state.db.complete_level(id, level)?))
}
