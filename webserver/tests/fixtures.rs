//! Test fixtures for webserver integration tests

#![allow(dead_code)]

use serde_json::{Value, json};

pub fn create_test_jha_body() -> Value {
    json!({
        "title": "Replace rooftop HVAC filter",
        "author": "J. Moreno",
        "job_description": "Swap the intake filters on unit 3",
        "job_location": "Building C roof",
    })
}

pub fn create_test_step_body(description: &str) -> Value {
    json!({ "step_description": description })
}

pub fn create_test_hazard_body() -> Value {
    json!({
        "description": "Fall from roof edge",
        "controls": "Harness tied off to anchor point",
    })
}
