//! Service implementations
//!
//! Real implementations of all service traits for production use

pub mod jha_repository;

#[cfg(test)]
mod tests;

// Re-export service implementations
pub use jha_repository::RealJhaRepository;
