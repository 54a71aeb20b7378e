//! Store configuration

use std::path::PathBuf;
use std::time::Duration;

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Private in-memory database, gone when the store is dropped
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// `:memory:` selects an in-memory database, anything else is a file path
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            ":memory:" => DatabaseLocation::Memory,
            path => DatabaseLocation::File(PathBuf::from(path)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub location: DatabaseLocation,
    /// How long SQLite waits on a locked database before reporting busy
    pub busy_timeout: Duration,
    /// Extra attempts for append/renumber after a transient conflict
    pub max_retries: u32,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::Memory,
            ..Self::default()
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(path.into()),
            ..Self::default()
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: DatabaseLocation::File(PathBuf::from("jha.db")),
            busy_timeout: Duration::from_millis(5000),
            max_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        assert_eq!(DatabaseLocation::parse(":memory:"), DatabaseLocation::Memory);
        assert_eq!(
            DatabaseLocation::parse("data/jha.db"),
            DatabaseLocation::File(PathBuf::from("data/jha.db"))
        );
    }

    #[test]
    fn test_builder_overrides() {
        let config = StoreConfig::in_memory()
            .with_busy_timeout(Duration::from_millis(250))
            .with_max_retries(0);

        assert_eq!(config.location, DatabaseLocation::Memory);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.max_retries, 0);
    }
}
