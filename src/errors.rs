use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::MessageResponse;

/// Request errors rejected before any browser work starts.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid JSON format.")]
    InvalidJson,

    #[error("Invalid request. Please provide all required data.")]
    MissingData,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidJson => StatusCode::BAD_REQUEST,
            AppError::MissingData => StatusCode::BAD_REQUEST,
        };

        let body = MessageResponse::new(self.to_string());
        (status, axum::Json(body)).into_response()
    }
}
