use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use levelr_core::models::Goal;
use levelr_core::plan::LevelDraft;
use levelr_core::progression::new_goal;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, ApiResult, AppState};
use crate::generation::GenerationRequest;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/quests", post(create_quest))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestInput {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub request: GenerationRequest,
}

/// Raw level drafts straight from the generator, without rewards.
async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> ApiResult<Json<Vec<LevelDraft>>> {
    request.validate().map_err(ApiError::BadRequest)?;
    let generated = state.planner.generate(&request).await?;
    Ok(Json(generated.drafts))
}

/// Generate a plan (placeholder on failure) and store it as a new goal.
async fn create_quest(
    State(state): State<AppState>,
    Json(input): Json<CreateQuestInput>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    input.request.validate().map_err(ApiError::BadRequest)?;
    if state.db.get_user(input.user_id)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let request = input.request;
    let plan = state.planner.plan_levels(&request).await;
    let goal = new_goal(
        input.user_id,
        request.title.trim(),
        request.category,
        request.difficulty,
        plan.levels,
    );
    state.db.upsert_goal(&goal)?;

    tracing::info!(
        goal_id = %goal.id,
        user_id = %goal.user_id,
        levels = goal.total_levels,
        model = plan.model.as_deref().unwrap_or("placeholder"),
        "Quest created"
    );
    Ok((StatusCode::CREATED, Json(goal)))
}
