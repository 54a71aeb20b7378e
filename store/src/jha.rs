//! JHA records and cascading deletes

use chrono::Utc;
use rusqlite::{OptionalExtension, Transaction, params};
use std::collections::BTreeMap;
use tracing::{debug, info};

use shared::{EntityKind, Hazard, Jha, JhaDetail, JhaId, JhaPatch, NewJha, StepDetail, StepId};

use crate::error::{StoreError, StoreResult};
use crate::sqlite::{
    JHA_COLUMNS, STEP_COLUMNS, SqliteStore, hazard_from_row, jha_from_row,
    require_optional_text, require_text, step_from_row,
};

/// Rows removed along with a parent record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub steps: usize,
    pub hazards: usize,
}

impl SqliteStore {
    pub fn create_jha(&mut self, request: &NewJha) -> StoreResult<Jha> {
        require_text("title", &request.title)?;
        require_text("author", &request.author)?;
        require_text("job_description", &request.job_description)?;
        require_text("job_location", &request.job_location)?;

        let now = Utc::now();
        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO jha(title, author, job_description, job_location, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                request.title,
                request.author,
                request.job_description,
                request.job_location,
                now,
                now,
            ],
        )?;
        let id = JhaId(tx.last_insert_rowid());
        let jha = load_jha_tx(&tx, id)?;
        tx.commit()?;

        info!(jha_id = %id, title = %jha.title, "Created JHA");
        Ok(jha)
    }

    /// All JHAs in creation order, without their steps
    pub fn list_jhas(&self) -> StoreResult<Vec<Jha>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {JHA_COLUMNS} FROM jha ORDER BY id"))?;
        let jhas = stmt
            .query_map([], jha_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(jhas)
    }

    /// A JHA with its steps ordered by number and each step's hazards
    pub fn get_jha(&mut self, id: JhaId) -> StoreResult<JhaDetail> {
        let tx = self.conn.transaction()?;
        let jha = load_jha_tx(&tx, id)?;

        let steps = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {STEP_COLUMNS} FROM step WHERE jha_id = ?1 ORDER BY step_number"
            ))?;
            stmt.query_map(params![id.get()], step_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut hazards_by_step: BTreeMap<StepId, Vec<Hazard>> = BTreeMap::new();
        {
            let mut stmt = tx.prepare(
                r#"
                SELECT h.id, h.step_id, h.description, h.controls
                FROM hazard h JOIN step s ON s.id = h.step_id
                WHERE s.jha_id = ?1
                ORDER BY h.id
                "#,
            )?;
            for hazard in stmt.query_map(params![id.get()], hazard_from_row)? {
                let hazard = hazard?;
                hazards_by_step.entry(hazard.step_id).or_default().push(hazard);
            }
        }
        tx.commit()?;

        let steps = steps
            .into_iter()
            .map(|step| StepDetail {
                hazards: hazards_by_step.remove(&step.id).unwrap_or_default(),
                step,
            })
            .collect();

        Ok(JhaDetail { jha, steps })
    }

    /// Replace the fields present in `patch`. An empty patch writes nothing.
    pub fn update_jha(&mut self, id: JhaId, patch: &JhaPatch) -> StoreResult<Jha> {
        require_optional_text("title", patch.title.as_deref())?;
        require_optional_text("author", patch.author.as_deref())?;
        require_optional_text("job_description", patch.job_description.as_deref())?;
        require_optional_text("job_location", patch.job_location.as_deref())?;

        let tx = self.conn.transaction()?;
        load_jha_tx(&tx, id)?;

        if !patch.is_empty() {
            tx.execute(
                r#"
                UPDATE jha SET
                  title = COALESCE(?1, title),
                  author = COALESCE(?2, author),
                  job_description = COALESCE(?3, job_description),
                  job_location = COALESCE(?4, job_location),
                  updated_at = ?5
                WHERE id = ?6
                "#,
                params![
                    patch.title,
                    patch.author,
                    patch.job_description,
                    patch.job_location,
                    Utc::now(),
                    id.get(),
                ],
            )?;
        }

        let jha = load_jha_tx(&tx, id)?;
        tx.commit()?;

        debug!(jha_id = %id, "Updated JHA");
        Ok(jha)
    }

    /// Delete a JHA together with its steps and their hazards.
    pub fn delete_jha(&mut self, id: JhaId) -> StoreResult<CascadeSummary> {
        let tx = self.conn.transaction()?;
        load_jha_tx(&tx, id)?;

        let hazards = tx.execute(
            "DELETE FROM hazard WHERE step_id IN (SELECT id FROM step WHERE jha_id = ?1)",
            params![id.get()],
        )?;
        let steps = tx.execute("DELETE FROM step WHERE jha_id = ?1", params![id.get()])?;
        tx.execute("DELETE FROM jha WHERE id = ?1", params![id.get()])?;
        tx.commit()?;

        let summary = CascadeSummary { steps, hazards };
        info!(jha_id = %id, steps, hazards, "Deleted JHA");
        Ok(summary)
    }
}

pub(crate) fn load_jha_tx(tx: &Transaction<'_>, id: JhaId) -> StoreResult<Jha> {
    tx.query_row(
        &format!("SELECT {JHA_COLUMNS} FROM jha WHERE id = ?1"),
        params![id.get()],
        jha_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found(EntityKind::Jha, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_jha() -> NewJha {
        NewJha {
            title: "Replace roof membrane".to_string(),
            author: "R. Ortega".to_string(),
            job_description: "Strip and replace the membrane on building C".to_string(),
            job_location: "Building C roof".to_string(),
        }
    }

    #[test]
    fn test_create_sets_both_timestamps() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let jha = store.create_jha(&new_jha()).unwrap();

        assert_eq!(jha.title, "Replace roof membrane");
        assert_eq!(jha.created_at, jha.updated_at);
    }

    #[test]
    fn test_create_rejects_blank_field() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let request = NewJha { author: " ".to_string(), ..new_jha() };

        let result = store.create_jha(&request);

        assert!(matches!(result, Err(StoreError::InvalidInput { field: "author", .. })));
        assert!(store.list_jhas().unwrap().is_empty());
    }

    #[test]
    fn test_update_bumps_updated_at_only_when_writing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let created = store.create_jha(&new_jha()).unwrap();

        let untouched = store.update_jha(created.id, &JhaPatch::default()).unwrap();
        assert_eq!(untouched, created);

        let patch = JhaPatch { job_location: Some("Building D roof".to_string()), ..Default::default() };
        let updated = store.update_jha(created.id, &patch).unwrap();
        assert_eq!(updated.job_location, "Building D roof");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_missing_jha_is_not_found() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert!(matches!(
            store.get_jha(JhaId(99)),
            Err(StoreError::NotFound { entity: EntityKind::Jha, id: 99 })
        ));
        assert!(matches!(
            store.delete_jha(JhaId(99)),
            Err(StoreError::NotFound { .. })
        ));
    }
}
