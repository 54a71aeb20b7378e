//! Hazards attached to steps

use rusqlite::{OptionalExtension, Transaction, params};
use tracing::{debug, info};

use shared::{EntityKind, Hazard, HazardId, HazardPatch, NewHazard, StepId};

use crate::error::{StoreError, StoreResult};
use crate::sqlite::{
    HAZARD_COLUMNS, SqliteStore, hazard_from_row, require_optional_text, require_text,
};
use crate::step::load_step_tx;

impl SqliteStore {
    pub fn create_hazard(&mut self, step_id: StepId, request: &NewHazard) -> StoreResult<Hazard> {
        require_text("description", &request.description)?;
        require_text("controls", &request.controls)?;

        let tx = self.conn.transaction()?;
        load_step_tx(&tx, step_id)?;
        tx.execute(
            "INSERT INTO hazard(step_id, description, controls) VALUES (?1, ?2, ?3)",
            params![step_id.get(), request.description, request.controls],
        )?;
        let hazard = load_hazard_tx(&tx, HazardId(tx.last_insert_rowid()))?;
        tx.commit()?;

        info!(step_id = %step_id, hazard_id = %hazard.id, "Created hazard");
        Ok(hazard)
    }

    pub fn get_hazard(&mut self, id: HazardId) -> StoreResult<Hazard> {
        let tx = self.conn.transaction()?;
        let hazard = load_hazard_tx(&tx, id)?;
        tx.commit()?;
        Ok(hazard)
    }

    pub fn update_hazard(&mut self, id: HazardId, patch: &HazardPatch) -> StoreResult<Hazard> {
        require_optional_text("description", patch.description.as_deref())?;
        require_optional_text("controls", patch.controls.as_deref())?;

        let tx = self.conn.transaction()?;
        let current = load_hazard_tx(&tx, id)?;
        if patch.is_empty() {
            tx.commit()?;
            return Ok(current);
        }

        tx.execute(
            r#"
            UPDATE hazard SET
              description = COALESCE(?1, description),
              controls = COALESCE(?2, controls)
            WHERE id = ?3
            "#,
            params![patch.description, patch.controls, id.get()],
        )?;
        let hazard = load_hazard_tx(&tx, id)?;
        tx.commit()?;

        debug!(hazard_id = %id, "Updated hazard");
        Ok(hazard)
    }

    pub fn delete_hazard(&mut self, id: HazardId) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        let hazard = load_hazard_tx(&tx, id)?;
        tx.execute("DELETE FROM hazard WHERE id = ?1", params![id.get()])?;
        tx.commit()?;

        info!(step_id = %hazard.step_id, hazard_id = %id, "Deleted hazard");
        Ok(())
    }
}

fn load_hazard_tx(tx: &Transaction<'_>, id: HazardId) -> StoreResult<Hazard> {
    tx.query_row(
        &format!("SELECT {HAZARD_COLUMNS} FROM hazard WHERE id = ?1"),
        params![id.get()],
        hazard_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found(EntityKind::Hazard, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazard_on_missing_step_is_not_found() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let result = store.create_hazard(
            StepId(5),
            &NewHazard { description: "Falling objects".into(), controls: "Hard hats".into() },
        );

        assert!(matches!(
            result,
            Err(StoreError::NotFound { entity: EntityKind::Step, id: 5 })
        ));
    }

    #[test]
    fn test_missing_hazard_is_not_found() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert!(matches!(
            store.get_hazard(HazardId(1)),
            Err(StoreError::NotFound { entity: EntityKind::Hazard, id: 1 })
        ));
        assert!(store.delete_hazard(HazardId(1)).is_err());
        assert!(store.update_hazard(HazardId(1), &HazardPatch::default()).is_err());
    }
}
