//! JHA endpoints

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::{debug, info};

use shared::JhaId;

use super::json_body;
use crate::error::WebServerResult;
use crate::traits::JhaRepository;
use crate::validation;
use crate::webserver_impl::WebServer;

/// POST /jha
pub async fn create_jha<R>(
    State(server): State<WebServer<R>>,
    body: Result<Json<Value>, JsonRejection>,
) -> WebServerResult<(StatusCode, Json<Value>)>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let request = validation::new_jha(&json_body(body)?)?;

    let jha = server.repository().create_jha(request).await?;
    info!("📝 Created JHA {} ({})", jha.id, jha.title);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "JHA created successfully", "jha": jha })),
    ))
}

/// GET /jhas
pub async fn list_jhas<R>(State(server): State<WebServer<R>>) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let jhas = server.repository().list_jhas().await?;
    debug!("Listing {} JHAs", jhas.len());

    Ok(Json(json!({ "jhas": jhas })))
}

/// GET /jha/{id}
pub async fn get_jha<R>(
    State(server): State<WebServer<R>>,
    Path(id): Path<String>,
) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let id: JhaId = id.parse()?;

    let jha = server.repository().get_jha(id).await?;
    Ok(Json(json!({ "jha": jha })))
}

/// PUT /jha/{id}
pub async fn update_jha<R>(
    State(server): State<WebServer<R>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let id: JhaId = id.parse()?;
    let patch = validation::jha_patch(&json_body(body)?)?;

    let jha = server.repository().update_jha(id, patch).await?;
    info!("✏️ Updated JHA {}", jha.id);

    Ok(Json(json!({ "message": "JHA updated successfully" })))
}

/// DELETE /jha/{id}
pub async fn delete_jha<R>(
    State(server): State<WebServer<R>>,
    Path(id): Path<String>,
) -> WebServerResult<Json<Value>>
where
    R: JhaRepository + 'static,
{
    server.state().record_request();
    let id: JhaId = id.parse()?;

    let removed = server.repository().delete_jha(id).await?;
    info!(
        "🗑️ Deleted JHA {} with {} steps and {} hazards",
        id, removed.steps, removed.hazards
    );

    Ok(Json(json!({ "message": "JHA deleted successfully" })))
}
