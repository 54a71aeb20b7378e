//! Shared types for the Job Hazard Analysis service
//!
//! Contains the domain records, typed identifiers and partial-update requests
//! that both the store and the webserver speak, plus the common logging setup.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
