//! SQLite connection, schema and retry handling

use rusqlite::{Connection, Row};
use std::time::Duration;
use tracing::{debug, info, warn};

use shared::{Hazard, HazardId, Jha, JhaId, Step, StepId};

use crate::config::{DatabaseLocation, StoreConfig};
use crate::error::{StoreError, StoreResult};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS jha (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      title TEXT NOT NULL,
      author TEXT NOT NULL,
      job_description TEXT NOT NULL,
      job_location TEXT NOT NULL,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS step (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      jha_id INTEGER NOT NULL REFERENCES jha(id),
      step_number INTEGER NOT NULL,
      step_description TEXT NOT NULL,
      UNIQUE (jha_id, step_number)
    );

    CREATE TABLE IF NOT EXISTS hazard (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      step_id INTEGER NOT NULL REFERENCES step(id),
      description TEXT NOT NULL,
      controls TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS hazard_step_id ON hazard(step_id);
"#;

/// JHA store backed by a single SQLite connection
#[derive(Debug)]
pub struct SqliteStore {
    pub(crate) conn: Connection,
    config: StoreConfig,
}

impl SqliteStore {
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let conn = match &config.location {
            DatabaseLocation::Memory => Connection::open_in_memory()?,
            DatabaseLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let conn = Connection::open(path)?;
                let mode: String =
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
                debug!(path = %path.display(), journal_mode = %mode, "Opened database file");
                conn
            }
        };

        conn.busy_timeout(config.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;

        let store = Self { conn, config };
        store.migrate()?;
        info!(location = ?store.config.location, "JHA store ready");
        Ok(store)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(StoreConfig::in_memory())
    }

    fn migrate(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Run `attempt` again while it fails with a transient error.
    ///
    /// Each attempt opens its own transaction, so a retry re-reads the rows
    /// and re-plans from scratch.
    pub(crate) fn with_retry<T>(
        &mut self,
        operation: &'static str,
        mut attempt: impl FnMut(&mut Self) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match attempt(self) {
                Err(err) if err.is_transient() && attempts <= self.config.max_retries => {
                    warn!(operation, attempts, error = %err, "Transient store conflict, retrying");
                    std::thread::sleep(retry_backoff(attempts));
                }
                Err(err) if err.is_transient() => {
                    warn!(operation, attempts, error = %err, "Retry budget exhausted");
                    return Err(StoreError::Conflict { operation, attempts });
                }
                result => return result,
            }
        }
    }
}

fn retry_backoff(attempts: u32) -> Duration {
    Duration::from_millis(10 * u64::from(attempts))
}

/// Reject blank text before it reaches a NOT NULL column.
pub(crate) fn require_text(field: &'static str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidInput { field, reason: "must not be empty" });
    }
    Ok(())
}

pub(crate) fn require_optional_text(field: &'static str, value: Option<&str>) -> StoreResult<()> {
    value.map_or(Ok(()), |value| require_text(field, value))
}

pub(crate) const JHA_COLUMNS: &str =
    "id, title, author, job_description, job_location, created_at, updated_at";
pub(crate) const STEP_COLUMNS: &str = "id, jha_id, step_number, step_description";
pub(crate) const HAZARD_COLUMNS: &str = "id, step_id, description, controls";

pub(crate) fn jha_from_row(row: &Row<'_>) -> rusqlite::Result<Jha> {
    Ok(Jha {
        id: JhaId(row.get(0)?),
        title: row.get(1)?,
        author: row.get(2)?,
        job_description: row.get(3)?,
        job_location: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub(crate) fn step_from_row(row: &Row<'_>) -> rusqlite::Result<Step> {
    Ok(Step {
        id: StepId(row.get(0)?),
        jha_id: JhaId(row.get(1)?),
        step_number: row.get(2)?,
        step_description: row.get(3)?,
    })
}

pub(crate) fn hazard_from_row(row: &Row<'_>) -> rusqlite::Result<Hazard> {
    Ok(Hazard {
        id: HazardId(row.get(0)?),
        step_id: StepId(row.get(1)?),
        description: row.get(2)?,
        controls: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::EntityKind;

    fn busy() -> StoreError {
        StoreError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ))
    }

    #[test]
    fn test_open_in_memory_creates_schema() {
        let store = SqliteStore::open_in_memory().unwrap();
        let tables: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('jha', 'step', 'hazard')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn test_retry_recovers_from_transient_failure() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut calls = 0;

        let result = store.with_retry("test", |_| {
            calls += 1;
            if calls < 3 { Err(busy()) } else { Ok(calls) }
        });

        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_retry_budget_exhaustion_is_a_conflict() {
        let mut store =
            SqliteStore::open(StoreConfig::in_memory().with_max_retries(2)).unwrap();
        let mut calls = 0;

        let result: StoreResult<()> = store.with_retry("append_step", |_| {
            calls += 1;
            Err(busy())
        });

        assert!(matches!(
            result,
            Err(StoreError::Conflict { operation: "append_step", attempts: 3 })
        ));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_does_not_repeat_permanent_errors() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut calls = 0;

        let result: StoreResult<()> = store.with_retry("test", |_| {
            calls += 1;
            Err(StoreError::not_found(EntityKind::Jha, 1))
        });

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_require_text_rejects_blank() {
        assert!(require_text("title", "Roof work").is_ok());
        assert!(require_text("title", "   ").is_err());
        assert!(require_optional_text("title", None).is_ok());
    }
}
