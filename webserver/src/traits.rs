//! Service trait definitions for dependency injection
//!
//! Handlers reach storage only through [`JhaRepository`], so tests can swap
//! in a mock and inject failures the real store cannot easily produce.

use async_trait::async_trait;

use shared::{
    Hazard, HazardId, HazardPatch, Jha, JhaDetail, JhaId, JhaPatch, NewHazard, NewJha, NewStep,
    Step, StepDetail, StepId, StepPatch,
};
use store::{CascadeSummary, StepUpdate};

use crate::error::WebServerResult;

/// JHA persistence as seen by the HTTP layer
#[mockall::automock]
#[async_trait]
pub trait JhaRepository: Send + Sync {
    async fn create_jha(&self, request: NewJha) -> WebServerResult<Jha>;

    async fn list_jhas(&self) -> WebServerResult<Vec<Jha>>;

    async fn get_jha(&self, id: JhaId) -> WebServerResult<JhaDetail>;

    async fn update_jha(&self, id: JhaId, patch: JhaPatch) -> WebServerResult<Jha>;

    /// Deletes the JHA with all of its steps and hazards
    async fn delete_jha(&self, id: JhaId) -> WebServerResult<CascadeSummary>;

    /// Appends a step numbered after the JHA's current highest number
    async fn append_step(&self, jha_id: JhaId, request: NewStep) -> WebServerResult<Step>;

    async fn get_step(&self, id: StepId) -> WebServerResult<StepDetail>;

    /// Updates a step; a taken `step_number` is swapped with its holder
    async fn update_step(&self, id: StepId, patch: StepPatch) -> WebServerResult<StepUpdate>;

    async fn delete_step(&self, id: StepId) -> WebServerResult<CascadeSummary>;

    async fn create_hazard(&self, step_id: StepId, request: NewHazard) -> WebServerResult<Hazard>;

    async fn get_hazard(&self, id: HazardId) -> WebServerResult<Hazard>;

    async fn update_hazard(&self, id: HazardId, patch: HazardPatch) -> WebServerResult<Hazard>;

    async fn delete_hazard(&self, id: HazardId) -> WebServerResult<()>;
}
