//! Relational persistence for Job Hazard Analyses
//!
//! `SqliteStore` owns the JHA, step and hazard tables. Step numbers are
//! planned by the pure functions in [`ordering`] and applied transactionally
//! by the store, so numbering is always recomputed from stored rows.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod ordering;
pub mod sqlite;

mod hazard;
mod jha;
mod step;

pub use config::{DatabaseLocation, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use jha::CascadeSummary;
pub use ordering::{RenumberPlan, Sibling};
pub use sqlite::SqliteStore;
pub use step::StepUpdate;
