//! Service tests for webserver
//!
//! Exercises the real repository against an in-memory store.
