use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use levelr_core::models::{UpdateUserInput, User};
use uuid::Uuid;

use super::{ApiError, ApiResult, AppState};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/users/{id}", get(get_user).put(update_user))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<User>> {
    state
        .db
        .get_user(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> ApiResult<Json<User>> {
    if let Some(password) = &input.password {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::bad_request(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
    }
    if let Some(email) = &input.email {
        if email.trim().is_empty() {
            return Err(ApiError::bad_request("Email cannot be empty"));
        }
        if let Some(existing) = state.db.find_user_by_email(email)? {
            if existing.id != id {
                return Err(ApiError::bad_request("User already exists"));
            }
        }
    }

    state
        .db
        .update_user(id, input)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}
