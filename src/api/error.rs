//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::ModelError;
use crate::pipeline::AnalysisError;
use crate::session::SessionError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::ModelUnavailable(detail) => (
                StatusCode::BAD_GATEWAY,
                "MODEL_UNAVAILABLE",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => ApiError::NotFound(format!("Session not found: {id}")),
            SessionError::LockPoisoned => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::NoQuestions => {
                ApiError::BadRequest("Please select at least one question to ask.".into())
            }
            AnalysisError::MissingImage => {
                ApiError::Conflict("Upload a medical image before running an analysis.".into())
            }
            AnalysisError::ModelNotLoaded => {
                ApiError::Conflict("The VQA model is not loaded; re-upload the image.".into())
            }
            AnalysisError::ImageDecode(_)
            | AnalysisError::ImageTooLarge { .. }
            | AnalysisError::ImageTooSmall => ApiError::BadRequest(err.to_string()),
            AnalysisError::ModelLoad(detail) => ApiError::ModelUnavailable(detail),
            AnalysisError::RemoteStatus { .. }
            | AnalysisError::HttpClient(_)
            | AnalysisError::ResponseParsing(_) => ApiError::Internal(err.to_string()),
        }
    }
}
