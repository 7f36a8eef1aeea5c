use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use levelr_core::models::{LoginInput, RegisterInput, User};

use super::{ApiError, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if !input.is_complete() {
        return Err(ApiError::bad_request("All fields are required"));
    }
    if state.db.find_user_by_email(&input.email)?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let user = state.db.create_user(input)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Unknown email and wrong password produce the same response.
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> ApiResult<Json<User>> {
    match state.db.find_user_by_credentials(&input.email, &input.password)? {
        Some(user) => {
            tracing::debug!(user_id = %user.id, "Login");
            Ok(Json(user))
        }
        None => Err(ApiError::bad_request("Invalid credentials")),
    }
}
