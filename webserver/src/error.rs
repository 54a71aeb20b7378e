//! WebServer-specific error types and their HTTP rendering

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use shared::{SharedError, logging};
use store::StoreError;
use thiserror::Error;

use crate::validation::FieldErrors;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Invalid request format: {details}")]
    InvalidRequest { details: String },

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    SharedError(#[from] SharedError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WebServerError {
    pub fn config(message: impl Into<String>) -> Self {
        WebServerError::Config(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebServerError::Validation(_) | WebServerError::InvalidRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            WebServerError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            WebServerError::Store(StoreError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            WebServerError::Store(StoreError::Conflict { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            WebServerError::Store(StoreError::NumberingExhausted { .. }) => StatusCode::CONFLICT,
            WebServerError::SharedError(SharedError::InvalidId { .. }) => StatusCode::NOT_FOUND,
            WebServerError::SharedError(SharedError::InvalidStepNumber { .. }) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            WebServerError::Validation(errors) => json!({ "errors": errors }),
            WebServerError::InvalidRequest { details } => {
                json!({ "errors": { "_schema": [details] } })
            }
            WebServerError::Store(StoreError::InvalidInput { field, reason }) => {
                json!({ "errors": FieldErrors::single(field, reason) })
            }
            WebServerError::SharedError(SharedError::InvalidStepNumber { value }) => {
                let message = crate::validation::step_number_message(*value);
                json!({ "errors": FieldErrors::single("step_number", message) })
            }
            WebServerError::Store(StoreError::Conflict { .. }) => {
                logging::log_error("Step numbering", &self);
                json!({ "error": "The store is busy, retry the request" })
            }
            _ if status.is_server_error() => {
                logging::log_error("Request", &self);
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub type WebServerResult<T> = Result<T, WebServerError>;
