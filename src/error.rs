//! Error types for the API
//!
//! Every failure leaving a handler is one of these kinds and is rendered as
//! a failed [`Envelope`]. Internal detail stays in the server log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::Envelope;
use crate::upstream::UpstreamError;

// == API Error Enum ==
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input; the message names the parameter
    #[error("{0}")]
    Validation(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Endpoint not found")]
    NotFound,

    /// A third-party service failed or returned unusable data
    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: UpstreamError,
    },

    /// Any other fault inside a handler
    #[error("{message}")]
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Wraps an upstream failure behind a route-level message.
    pub fn upstream(message: &'static str, source: UpstreamError) -> Self {
        ApiError::Upstream { message, source }
    }

    pub fn internal(message: &'static str, detail: impl Into<String>) -> Self {
        ApiError::Internal {
            message,
            detail: detail.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Display only ever yields the caller-facing message
        Envelope::failure(self.to_string(), self.status_code()).into_response()
    }
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, ApiError>;
