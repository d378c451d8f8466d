use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::error::ForecastError;

/// API error types that can be returned from handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Forecast error: {0}")]
    ForecastFailed(String),
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) | ApiError::ForecastFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::ValidationError(_) => "ValidationError",
            ApiError::InternalError(_) => "InternalServerError",
            ApiError::ForecastFailed(_) => "ForecastError",
        }
    }

    /// Message safe to show to the user.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::InternalError(_) | ApiError::ForecastFailed(_) => {
                "An internal error occurred".to_string()
            }
            ApiError::NotFound(msg) | ApiError::ValidationError(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        match &self {
            ApiError::InternalError(_) | ApiError::ForecastFailed(_) => {
                tracing::error!(error = %self, "API error occurred");
            }
            _ => {
                tracing::debug!(error = %self, "Client error");
            }
        }

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message: self.public_message(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<ForecastError> for ApiError {
    fn from(error: ForecastError) -> Self {
        match error {
            ForecastError::ArtifactNotFound { .. } | ForecastError::UnknownVariable(_) => {
                ApiError::NotFound(error.to_string())
            }
            ForecastError::InvalidHorizon { .. } | ForecastError::HorizonNotANumber { .. } => {
                ApiError::ValidationError(error.to_string())
            }
            ForecastError::MalformedArtifact { .. }
            | ForecastError::Io { .. }
            | ForecastError::Prediction(_)
            | ForecastError::Export(_)
            | ForecastError::Render(_) => ApiError::ForecastFailed(error.to_string()),
        }
    }
}
