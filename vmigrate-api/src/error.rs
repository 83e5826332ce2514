use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use vmigrate_orchestrator::OrchestratorError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            OrchestratorError::InvalidInput(msg) => ApiError::BadRequest(msg),
            OrchestratorError::IneligibleState { .. } => {
                ApiError::BadRequest("migration can't run".to_string())
            }
            OrchestratorError::RunFailed(failure) => ApiError::BadRequest(failure.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
