//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::ServiceError;
use crate::usecases::UseCaseError;

/// Application-level error type for the JSON API.
#[derive(Debug, Error)]
pub enum AppError {
    /// A use case failed.
    #[error(transparent)]
    UseCase(#[from] UseCaseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UseCase(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::UseCase(err) if err.is_rejected() => StatusCode::BAD_REQUEST,
            Self::UseCase(err) => match err.service_error() {
                Some(ServiceError::Transport(_) | ServiceError::Simulated) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::AdapterError;

    fn use_case_error(source: ServiceError) -> AppError {
        AppError::UseCase(UseCaseError::Fetch {
            concern: "product information",
            source: AdapterError {
                operation: "product info",
                source,
            },
        })
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = use_case_error(ServiceError::not_found("Product", "MCO1"));
        assert_eq!(
            err.to_string(),
            "Error getting product information: Error fetching product info: Product with id MCO1 not found"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            use_case_error(ServiceError::not_found("Product", "MCO1")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            use_case_error(ServiceError::Validation("Title is required".to_owned())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            use_case_error(ServiceError::Simulated).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::UseCase(UseCaseError::rejected("total cost", "Cantidad no disponible en stock")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("test".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
