use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use levelr_core::{GoalUpdateError, ProgressionError};
use serde_json::json;

use crate::generation::GenerationError;

/// Errors returned to HTTP clients as `{"message": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    BadGateway(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<GoalUpdateError> for ApiError {
    fn from(err: GoalUpdateError) -> Self {
        match err {
            GoalUpdateError::GoalNotFound | GoalUpdateError::UserNotFound => {
                Self::NotFound(err.to_string())
            }
            GoalUpdateError::Progression(e) => e.into(),
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<ProgressionError> for ApiError {
    fn from(err: ProgressionError) -> Self {
        match err {
            ProgressionError::LevelNotFound(_) => Self::NotFound(err.to_string()),
            ProgressionError::TaskOutOfRange { .. } => Self::BadRequest(err.to_string()),
            ProgressionError::LevelLocked(_)
            | ProgressionError::AlreadyCompleted(_)
            | ProgressionError::Inconsistent(_) => Self::Conflict(err.to_string()),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingApiKey => Self::Unavailable(err.to_string()),
            other => Self::BadGateway(other.to_string()),
        }
    }
}
