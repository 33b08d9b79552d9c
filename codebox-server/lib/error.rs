//! Error types for the codebox server.
//!
//! Every error renders as `{"success": false, "error": {"message": ...}}`. Client mistakes keep
//! their message; host faults are logged and replaced by a generic one.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codebox_core::CodeboxError;
use serde::Serialize;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a server-related operation.
pub type ServerResult<T> = Result<T, ServerError>;

/// An error that occurred while serving a request.
#[derive(pretty_error_debug::Debug, Error)]
pub enum ServerError {
    /// The request body could not be read as the expected JSON.
    #[error(transparent)]
    InvalidPayload(#[from] JsonRejection),

    /// The request was well-formed JSON but is not acceptable.
    #[error("{0}")]
    ValidationError(String),

    /// Every execution slot is taken.
    #[error("server is at capacity, try again later")]
    Busy,

    /// An error from the execution pipeline.
    #[error(transparent)]
    Execution(#[from] CodeboxError),

    /// The server configuration is invalid.
    #[error("config error: {0}")]
    ConfigError(String),

    /// An I/O error, typically from binding the listener.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,

    /// What went wrong
    pub error: ErrorDetail,
}

/// The message part of an [`ErrorResponse`].
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Human-readable description
    pub message: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ServerError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidPayload(rejection)
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ServerError::InvalidPayload(_) | ServerError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Execution(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::Busy => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Execution(_)
            | ServerError::ConfigError(_)
            | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!("request failed: {}", self);
            "Internal server error".to_string()
        } else {
            match &self {
                ServerError::InvalidPayload(rejection) => rejection.body_text(),
                _ => self.to_string(),
            }
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorDetail { message },
        };

        (status, Json(body)).into_response()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
