//! Error types for the REST API.

use crate::execution::{CommandId, CommandKind, ExecutionError, TradeParamsError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

#[cfg(test)]
mod tests;

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The operation needs a brokerage session.
    #[error("Brokerage not connected")]
    NotConnected,

    /// No listed contract matches the request.
    #[error("Contract not found: {0}")]
    ContractNotFound(String),

    /// Opening a brokerage session failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The brokerage failed the request.
    #[error("Brokerage error: {0}")]
    Brokerage(String),

    /// The command did not report back within the wait.
    ///
    /// The command may still complete; the registry is authoritative.
    #[error("No confirmation received for {operation} (command #{command_id})")]
    NoConfirmation {
        /// Id of the queued command.
        command_id: CommandId,
        /// Kind of the queued command.
        operation: CommandKind,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::NotConnected => (StatusCode::BAD_REQUEST, "NOT_CONNECTED"),
            ApiError::ContractNotFound(_) => (StatusCode::NOT_FOUND, "CONTRACT_NOT_FOUND"),
            ApiError::Connection(_) => (StatusCode::BAD_GATEWAY, "CONNECTION_ERROR"),
            ApiError::Brokerage(_) => (StatusCode::BAD_GATEWAY, "BROKERAGE_ERROR"),
            ApiError::NoConfirmation { .. } => (StatusCode::GATEWAY_TIMEOUT, "NO_CONFIRMATION"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::NotConnected => ApiError::NotConnected,
            ExecutionError::ContractNotFound(descriptor) => ApiError::ContractNotFound(descriptor),
            ExecutionError::Connection(_) | ExecutionError::ConnectTimeout(_) => {
                ApiError::Connection(err.to_string())
            }
            ExecutionError::Brokerage(inner) => ApiError::Brokerage(inner.to_string()),
            ExecutionError::WorkerUnavailable => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<TradeParamsError> for ApiError {
    fn from(err: TradeParamsError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}
