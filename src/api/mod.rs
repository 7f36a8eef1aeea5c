//! HTTP/JSON API.
//!
//! ## Endpoints
//! - `GET  /health`
//! - `POST /api/auth/register`, `POST /api/auth/login`
//! - `GET|PUT /api/users/{id}`
//! - `GET|POST /api/goals`, `GET|DELETE /api/goals/{id}`
//! - `PUT  /api/goals/{id}/levels/{level}/tasks/{index}`
//! - `POST /api/goals/{id}/levels/{level}/complete`
//! - `POST /api/generate`, `POST /api/quests`

mod auth;
mod error;
mod goals;
mod quests;
mod users;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use levelr_core::Database;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::generation::LevelPlanner;

pub use error::{ApiError, ApiResult};

/// Shared state available to all API handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub planner: Arc<LevelPlanner>,
}

impl AppState {
    pub fn new(db: Database, planner: LevelPlanner) -> Self {
        Self {
            db,
            planner: Arc::new(planner),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes())
        .merge(users::routes())
        .merge(goals::routes())
        .merge(quests::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
