//! HTTP request handlers
//!
//! Handlers share a small amount of plumbing: every API request counts toward
//! the served total and every JSON body is read as a raw [`Value`] so that
//! validation can report per-field messages instead of a decode failure.

pub mod hazard;
pub mod health;
pub mod jha;
pub mod step;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;

use crate::error::{WebServerError, WebServerResult};

/// Unwrap a JSON body, turning a malformed or missing body into a 400
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> WebServerResult<Value> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(WebServerError::InvalidRequest {
            details: rejection.body_text(),
        }),
    }
}
