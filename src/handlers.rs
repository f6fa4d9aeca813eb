pub mod api;
pub mod dashboard;
pub mod health;

use axum::{http::StatusCode, response::Json};
use compute::DashboardError;

use crate::schemas::ErrorResponse;

/// Maps a core error onto the JSON error envelope.
pub fn error_response(err: &DashboardError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match err {
        DashboardError::Arity { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "ARITY_ERROR"),
        DashboardError::InvalidInput { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_INPUT"),
        DashboardError::UnknownVariable(_) => (StatusCode::NOT_FOUND, "UNKNOWN_VARIABLE"),
        DashboardError::Load { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "LOAD_ERROR"),
        DashboardError::DataFrame(_) | DashboardError::Runtime(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    let body = ErrorResponse {
        error: err.to_string(),
        code: code.to_string(),
        success: false,
    };
    (status, Json(body))
}
