//! Liveness endpoint

use axum::{Json, extract::State};
use chrono::Utc;
use serde_json::{Value, json};

use crate::traits::JhaRepository;
use crate::webserver_impl::WebServer;

/// GET /health
pub async fn health_check<R>(State(server): State<WebServer<R>>) -> Json<Value>
where
    R: JhaRepository + 'static,
{
    let state = server.state();
    let status = if state.is_running() { "healthy" } else { "shutting_down" };
    Json(json!({
        "status": status,
        "uptime_seconds": state.get_uptime_seconds(),
        "requests_served": state.get_requests_served(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
