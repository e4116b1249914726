use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::error_with_trace;
use crate::models::ServiceError;

/// Failures a handler cannot turn into a normal page or cart reply
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error_with_trace!(error = %self, "Request failed with internal error");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": "Error interno del servidor",
                "error": "internal_error",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
