//! Hazard endpoints

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::info;

use shared::{HazardId, StepId};

use super::json_body;
use crate::error::WebServerResult;
use crate::traits::JhaRepository;
use crate::validation;
use crate::webserver_impl::WebServer;

/// POST /step/{id}/hazard
pub async fn create_hazard<R>(
    State(server): State<WebServer<R>>,
    Path(step_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> WebServerResult<(StatusCode, Json<Value>)>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let step_id: StepId = step_id.parse()?;
    let request = validation::new_hazard(&json_body(body)?)?;

    let hazard = server.repository().create_hazard(step_id, request).await?;
    info!("⚠️ Added hazard {} to step {}", hazard.id, step_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Hazard added successfully", "hazard": hazard })),
    ))
}

/// GET /hazard/{id}
pub async fn get_hazard<R>(
    State(server): State<WebServer<R>>,
    Path(id): Path<String>,
) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let id: HazardId = id.parse()?;

    let hazard = server.repository().get_hazard(id).await?;
    Ok(Json(json!({ "hazard": hazard })))
}

/// PUT /hazard/{id}
pub async fn update_hazard<R>(
    State(server): State<WebServer<R>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let id: HazardId = id.parse()?;
    let patch = validation::hazard_patch(&json_body(body)?)?;

    server.repository().update_hazard(id, patch).await?;
    info!("✏️ Updated hazard {}", id);

    Ok(Json(json!({ "message": "Hazard updated successfully" })))
}

/// DELETE /hazard/{id}
pub async fn delete_hazard<R>(
    State(server): State<WebServer<R>>,
    Path(id): Path<String>,
) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let id: HazardId = id.parse()?;

    server.repository().delete_hazard(id).await?;
    info!("🗑️ Deleted hazard {}", id);

    Ok(Json(json!({ "message": "Hazard deleted successfully" })))
}
