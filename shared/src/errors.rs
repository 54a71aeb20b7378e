//! Shared error types for the Job Hazard Analysis service

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid {entity} id: {input}")]
    InvalidId { entity: &'static str, input: String },

    #[error("Invalid step number: {value}")]
    InvalidStepNumber { value: i64 },
}

pub type SharedResult<T> = Result<T, SharedError>;
