//! Steps: appending, renumbering and deletion

use rusqlite::{OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::{debug, info};

use shared::{EntityKind, JhaId, MAX_STEP_NUMBER, NewStep, Step, StepDetail, StepId, StepPatch};

use crate::error::{StoreError, StoreResult};
use crate::jha::{CascadeSummary, load_jha_tx};
use crate::ordering::{self, PARKED_STEP_NUMBER, RenumberPlan, Sibling};
use crate::sqlite::{
    HAZARD_COLUMNS, STEP_COLUMNS, SqliteStore, hazard_from_row, require_optional_text,
    require_text, step_from_row,
};

/// A step after an update, plus what happened to its number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepUpdate {
    pub step: Step,
    pub renumber: RenumberPlan,
}

impl SqliteStore {
    /// Append a step numbered one past the JHA's current highest number.
    pub fn append_step(&mut self, jha_id: JhaId, request: &NewStep) -> StoreResult<Step> {
        require_text("step_description", &request.step_description)?;
        self.with_retry("append_step", |store| store.append_step_once(jha_id, request))
    }

    fn append_step_once(&mut self, jha_id: JhaId, request: &NewStep) -> StoreResult<Step> {
        // IMMEDIATE takes the write lock before the max read, so two appends
        // can never plan against the same snapshot.
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        load_jha_tx(&tx, jha_id)?;

        let existing: Vec<u32> = siblings_tx(&tx, jha_id)?
            .iter()
            .map(|sibling| sibling.step_number)
            .collect();
        let Some(step_number) = ordering::next_step_number(&existing) else {
            let highest = existing.iter().copied().max().unwrap_or(MAX_STEP_NUMBER);
            return Err(StoreError::NumberingExhausted { jha_id: jha_id.get(), highest });
        };

        tx.execute(
            "INSERT INTO step(jha_id, step_number, step_description) VALUES (?1, ?2, ?3)",
            params![jha_id.get(), step_number, request.step_description],
        )?;
        let step = load_step_tx(&tx, StepId(tx.last_insert_rowid()))?;
        tx.commit()?;

        info!(jha_id = %jha_id, step_id = %step.id, step_number, "Appended step");
        Ok(step)
    }

    /// A step with its hazards in creation order
    pub fn get_step(&mut self, id: StepId) -> StoreResult<StepDetail> {
        let tx = self.conn.transaction()?;
        let step = load_step_tx(&tx, id)?;
        let hazards = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {HAZARD_COLUMNS} FROM hazard WHERE step_id = ?1 ORDER BY id"
            ))?;
            stmt.query_map(params![id.get()], hazard_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        tx.commit()?;
        Ok(StepDetail { step, hazards })
    }

    /// Apply a partial update. A new `step_number` that another step of the
    /// same JHA holds swaps the two numbers in one transaction.
    pub fn update_step(&mut self, id: StepId, patch: &StepPatch) -> StoreResult<StepUpdate> {
        require_optional_text("step_description", patch.step_description.as_deref())?;
        match patch.step_number {
            Some(PARKED_STEP_NUMBER) => {
                return Err(StoreError::InvalidInput {
                    field: "step_number",
                    reason: "must be at least 1",
                });
            }
            Some(number) if number > MAX_STEP_NUMBER => {
                return Err(StoreError::InvalidInput {
                    field: "step_number",
                    reason: "must be at most 2147483647",
                });
            }
            _ => {}
        }
        self.with_retry("update_step", |store| store.update_step_once(id, patch))
    }

    fn update_step_once(&mut self, id: StepId, patch: &StepPatch) -> StoreResult<StepUpdate> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = load_step_tx(&tx, id)?;

        let renumber = match ordering::requested_move(current.step_number, patch.step_number) {
            None => RenumberPlan::Unchanged,
            Some(to) => {
                let siblings = siblings_tx(&tx, current.jha_id)?;
                let step = Sibling { id, step_number: current.step_number };
                ordering::plan_renumber(step, to, &siblings)
            }
        };
        apply_renumber_tx(&tx, renumber)?;

        if let Some(step_description) = &patch.step_description {
            tx.execute(
                "UPDATE step SET step_description = ?1 WHERE id = ?2",
                params![step_description, id.get()],
            )?;
        }

        let step = if renumber.is_unchanged() && patch.step_description.is_none() {
            current
        } else {
            load_step_tx(&tx, id)?
        };
        tx.commit()?;

        debug!(step_id = %id, plan = ?renumber, "Updated step");
        Ok(StepUpdate { step, renumber })
    }

    /// Delete a step and its hazards. Sibling numbers are left as they are.
    pub fn delete_step(&mut self, id: StepId) -> StoreResult<CascadeSummary> {
        let tx = self.conn.transaction()?;
        let step = load_step_tx(&tx, id)?;

        let hazards = tx.execute("DELETE FROM hazard WHERE step_id = ?1", params![id.get()])?;
        let steps = tx.execute("DELETE FROM step WHERE id = ?1", params![id.get()])?;
        tx.commit()?;

        info!(jha_id = %step.jha_id, step_id = %id, step_number = step.step_number, hazards, "Deleted step");
        Ok(CascadeSummary { steps, hazards })
    }
}

fn apply_renumber_tx(tx: &Transaction<'_>, plan: RenumberPlan) -> StoreResult<()> {
    match plan {
        RenumberPlan::Unchanged => {}
        RenumberPlan::Move { step_id, from, to } => {
            set_step_number_tx(tx, step_id, to)?;
            info!(step_id = %step_id, from, to, "Moved step");
        }
        RenumberPlan::Swap { step_id, from, to, displaced } => {
            // Park the holder first so UNIQUE(jha_id, step_number) holds after
            // every statement.
            set_step_number_tx(tx, displaced, PARKED_STEP_NUMBER)?;
            set_step_number_tx(tx, step_id, to)?;
            set_step_number_tx(tx, displaced, from)?;
            info!(step_id = %step_id, displaced = %displaced, from, to, "Swapped step numbers");
        }
    }
    Ok(())
}

fn set_step_number_tx(tx: &Transaction<'_>, id: StepId, step_number: u32) -> StoreResult<()> {
    tx.execute(
        "UPDATE step SET step_number = ?1 WHERE id = ?2",
        params![step_number, id.get()],
    )?;
    Ok(())
}

fn siblings_tx(tx: &Transaction<'_>, jha_id: JhaId) -> StoreResult<Vec<Sibling>> {
    let mut stmt = tx.prepare("SELECT id, step_number FROM step WHERE jha_id = ?1")?;
    let siblings = stmt
        .query_map(params![jha_id.get()], |row| {
            Ok(Sibling { id: StepId(row.get(0)?), step_number: row.get(1)? })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(siblings)
}

pub(crate) fn load_step_tx(tx: &Transaction<'_>, id: StepId) -> StoreResult<Step> {
    tx.query_row(
        &format!("SELECT {STEP_COLUMNS} FROM step WHERE id = ?1"),
        params![id.get()],
        step_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found(EntityKind::Step, id))
}
