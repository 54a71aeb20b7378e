//! Webserver library for the Job Hazard Analysis API
//!
//! Exposes JHAs, their ordered steps and the hazards of each step over a
//! JSON HTTP API. Storage is reached through the [`JhaRepository`] trait so
//! handlers can be exercised against a mock.

pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod traits;
pub mod validation;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use config::{Args, ServerConfig};
pub use error::{WebServerError, WebServerResult};
pub use state::WebServerState;
pub use validation::FieldErrors;
pub use webserver_impl::WebServer;

// Re-export trait definitions
pub use traits::JhaRepository;

// Re-export service implementations
pub use services::RealJhaRepository;
