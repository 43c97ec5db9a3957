use axum::{
    response::{IntoResponse, Response, Json},
    http::StatusCode,
};
use serde_json::json;
use crate::errors::AppError;

// The IntoResponse trait implementation converts AppError into a well-formed HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Missing or bad credentials
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,

            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            AppError::Validation(_) => StatusCode::BAD_REQUEST,

            // Duplicate usernames and broken ownership chains
            AppError::Conflict(_) => StatusCode::CONFLICT,

            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,

            // Store and session failures are internal server errors
            AppError::Session(msg) => {
                tracing::error!("Session failure: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Store { context, source } => {
                tracing::error!("{}: {}", context, source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            AppError::Session(_) => "Server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
