//! Unified error handling with Sentry integration.
//!
//! Handlers return [`AppError`]; server-side failures are captured to Sentry
//! before the client sees a response. Every error body uses the same JSON
//! envelope as successful responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::personalize::PersonalizeError;
use crate::routes::ApiResponse;
use crate::shopify::ApiError;

/// Generic message for 5xx responses.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application-level error type for the proxy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Shopify API operation failed.
    #[error(transparent)]
    Shopify(#[from] ApiError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PersonalizeError> for AppError {
    fn from(err: PersonalizeError) -> Self {
        match err {
            PersonalizeError::InvalidInput => Self::BadRequest(err.to_string()),
            PersonalizeError::CustomerNotFound => Self::NotFound(err.to_string()),
            PersonalizeError::Upstream(e) => Self::Shopify(e),
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Shopify(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client.
    ///
    /// Server errors are reduced to a generic message unless `expose_errors`
    /// is set.
    #[must_use]
    pub fn public_message(&self, expose_errors: bool) -> String {
        if self.status().is_server_error() && !expose_errors {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    /// Build the response, optionally passing internal messages through.
    #[must_use]
    pub fn into_response_with(self, expose_errors: bool) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ApiResponse::<()>::error(self.public_message(expose_errors));
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
