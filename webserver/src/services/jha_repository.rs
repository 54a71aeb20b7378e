//! SQLite-backed repository
//!
//! The store is synchronous, so every call runs on the blocking pool while
//! holding the store's lock. One call at a time touches the connection.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use shared::{
    Hazard, HazardId, HazardPatch, Jha, JhaDetail, JhaId, JhaPatch, NewHazard, NewJha, NewStep,
    Step, StepDetail, StepId, StepPatch,
};
use store::{CascadeSummary, SqliteStore, StepUpdate, StoreConfig, StoreResult};

use crate::error::{WebServerError, WebServerResult};
use crate::traits::JhaRepository;

/// Real repository over a shared SQLite store
#[derive(Clone)]
pub struct RealJhaRepository {
    store: Arc<Mutex<SqliteStore>>,
}

impl RealJhaRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store: Arc::new(Mutex::new(store)) }
    }

    /// Open the store described by `config` on the blocking pool
    pub async fn open(config: StoreConfig) -> WebServerResult<Self> {
        let store = tokio::task::spawn_blocking(move || SqliteStore::open(config))
            .await
            .map_err(|e| WebServerError::InternalError(format!("store open task failed: {e}")))??;
        Ok(Self::new(store))
    }

    async fn run<T, F>(&self, operation: &'static str, f: F) -> WebServerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteStore) -> StoreResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut store = store.blocking_lock();
            f(&mut store)
        })
        .await
        .map_err(|e| WebServerError::InternalError(format!("{operation} task failed: {e}")))?;

        debug!(operation, ok = result.is_ok(), "Store call finished");
        Ok(result?)
    }
}

#[async_trait]
impl JhaRepository for RealJhaRepository {
    async fn create_jha(&self, request: NewJha) -> WebServerResult<Jha> {
        self.run("create_jha", move |store| store.create_jha(&request)).await
    }

    async fn list_jhas(&self) -> WebServerResult<Vec<Jha>> {
        self.run("list_jhas", |store| store.list_jhas()).await
    }

    async fn get_jha(&self, id: JhaId) -> WebServerResult<JhaDetail> {
        self.run("get_jha", move |store| store.get_jha(id)).await
    }

    async fn update_jha(&self, id: JhaId, patch: JhaPatch) -> WebServerResult<Jha> {
        self.run("update_jha", move |store| store.update_jha(id, &patch)).await
    }

    async fn delete_jha(&self, id: JhaId) -> WebServerResult<CascadeSummary> {
        self.run("delete_jha", move |store| store.delete_jha(id)).await
    }

    async fn append_step(&self, jha_id: JhaId, request: NewStep) -> WebServerResult<Step> {
        self.run("append_step", move |store| store.append_step(jha_id, &request)).await
    }

    async fn get_step(&self, id: StepId) -> WebServerResult<StepDetail> {
        self.run("get_step", move |store| store.get_step(id)).await
    }

    async fn update_step(&self, id: StepId, patch: StepPatch) -> WebServerResult<StepUpdate> {
        self.run("update_step", move |store| store.update_step(id, &patch)).await
    }

    async fn delete_step(&self, id: StepId) -> WebServerResult<CascadeSummary> {
        self.run("delete_step", move |store| store.delete_step(id)).await
    }

    async fn create_hazard(&self, step_id: StepId, request: NewHazard) -> WebServerResult<Hazard> {
        self.run("create_hazard", move |store| store.create_hazard(step_id, &request)).await
    }

    async fn get_hazard(&self, id: HazardId) -> WebServerResult<Hazard> {
        self.run("get_hazard", move |store| store.get_hazard(id)).await
    }

    async fn update_hazard(&self, id: HazardId, patch: HazardPatch) -> WebServerResult<Hazard> {
        self.run("update_hazard", move |store| store.update_hazard(id, &patch)).await
    }

    async fn delete_hazard(&self, id: HazardId) -> WebServerResult<()> {
        self.run("delete_hazard", move |store| store.delete_hazard(id)).await
    }
}
