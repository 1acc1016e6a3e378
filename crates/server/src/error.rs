use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine_bridge::EngineError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Analysis engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Analysis engine not ready")]
    EngineNotReady,

    #[error("Analysis engine timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Unavailable(msg) => AppError::EngineUnavailable(msg),
            EngineError::NotReady => AppError::EngineNotReady,
            EngineError::Timeout(what) => AppError::Timeout(what),
            EngineError::Terminated => {
                AppError::EngineUnavailable("engine terminated before responding".to_string())
            }
            EngineError::Config(msg) => AppError::Internal(msg),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::EngineUnavailable(_) | AppError::EngineNotReady => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(msg) => tracing::error!("Internal error: {msg}"),
            AppError::EngineUnavailable(_) | AppError::EngineNotReady | AppError::Timeout(_) => {
                tracing::warn!("{self}")
            }
            AppError::BadRequest(_) => {}
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
