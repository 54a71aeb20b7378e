//! Web layer for the JHA API

pub mod handlers;
