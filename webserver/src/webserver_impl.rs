//! Main webserver implementation
//!
//! `WebServer` wires the repository into the axum router and owns the
//! serve loop. Handlers live in [`crate::web::handlers`].

use axum::{
    Router,
    routing::{get, post},
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;
use crate::traits::JhaRepository;
use crate::web::handlers::{hazard, health, jha, step};

/// Main webserver struct with dependency injection
pub struct WebServer<R>
where
    R: JhaRepository,
{
    state: Arc<WebServerState>,
    repository: Arc<R>,
}

impl<R: JhaRepository> Clone for WebServer<R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            repository: self.repository.clone(),
        }
    }
}

impl<R> WebServer<R>
where
    R: JhaRepository + 'static,
{
    /// Create a new webserver with dependency injection
    pub fn new(bind_address: SocketAddr, repository: R) -> Self {
        Self {
            state: Arc::new(WebServerState::new(bind_address)),
            repository: Arc::new(repository),
        }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            // JHA routes
            .route("/jha", post(jha::create_jha::<R>))
            .route("/jhas", get(jha::list_jhas::<R>))
            .route(
                "/jha/:id",
                get(jha::get_jha::<R>)
                    .put(jha::update_jha::<R>)
                    .delete(jha::delete_jha::<R>),
            )
            .route("/jha/:id/step", post(step::append_step::<R>))

            // Step routes
            .route(
                "/step/:id",
                get(step::get_step::<R>)
                    .put(step::update_step::<R>)
                    .delete(step::delete_step::<R>),
            )
            .route("/step/:id/hazard", post(hazard::create_hazard::<R>))

            // Hazard routes
            .route(
                "/hazard/:id",
                get(hazard::get_hazard::<R>)
                    .put(hazard::update_hazard::<R>)
                    .delete(hazard::delete_hazard::<R>),
            )

            // Health check
            .route("/health", get(health::health_check::<R>))

            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.clone())
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F) -> WebServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let bind_address = self.state.bind_address;

        let listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Failed to bind to {bind_address}: {e}")))?;

        info!("🌐 JHA API listening on http://{}", bind_address);

        let state = self.state.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                state.set_running(false);
            })
            .await?;

        Ok(())
    }

    /// Get server state for external access
    pub fn state(&self) -> &Arc<WebServerState> {
        &self.state
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}
