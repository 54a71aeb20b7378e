//! Step endpoints

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::info;

use shared::{JhaId, StepId};
use store::RenumberPlan;

use super::json_body;
use crate::error::WebServerResult;
use crate::traits::JhaRepository;
use crate::validation;
use crate::webserver_impl::WebServer;

/// POST /jha/{id}/step
///
/// Any `step_number` in the body is ignored; the step is always appended.
pub async fn append_step<R>(
    State(server): State<WebServer<R>>,
    Path(jha_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> WebServerResult<(StatusCode, Json<Value>)>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let jha_id: JhaId = jha_id.parse()?;
    let request = validation::new_step(&json_body(body)?)?;

    let step = server.repository().append_step(jha_id, request).await?;
    info!("➕ Appended step {} to JHA {} as #{}", step.id, jha_id, step.step_number);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Step added successfully", "step": step })),
    ))
}

/// GET /step/{id}
pub async fn get_step<R>(
    State(server): State<WebServer<R>>,
    Path(id): Path<String>,
) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let id: StepId = id.parse()?;

    let step = server.repository().get_step(id).await?;
    Ok(Json(json!({ "step": step })))
}

/// PUT /step/{id}
pub async fn update_step<R>(
    State(server): State<WebServer<R>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let id: StepId = id.parse()?;
    let patch = validation::step_patch(&json_body(body)?)?;

    let update = server.repository().update_step(id, patch).await?;
    match update.renumber {
        RenumberPlan::Unchanged => info!("✏️ Updated step {}", id),
        RenumberPlan::Move { from, to, .. } => info!("↕️ Moved step {} from #{} to #{}", id, from, to),
        RenumberPlan::Swap { from, to, displaced, .. } => info!(
            "🔀 Swapped step {} (#{} -> #{}) with step {}",
            id, from, to, displaced
        ),
    }

    Ok(Json(json!({ "message": "Step updated successfully" })))
}

/// DELETE /step/{id}
///
/// Remaining steps keep their numbers.
pub async fn delete_step<R>(
    State(server): State<WebServer<R>>,
    Path(id): Path<String>,
) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let id: StepId = id.parse()?;

    let removed = server.repository().delete_step(id).await?;
    info!("🗑️ Deleted step {} with {} hazards", id, removed.hazards);

    Ok(Json(json!({ "message": "Step deleted successfully" })))
}
