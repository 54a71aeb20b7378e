//! Server configuration from the command line and environment

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use store::{DatabaseLocation, StoreConfig};

use crate::error::{WebServerError, WebServerResult};

/// Job Hazard Analysis API server
#[derive(Parser, Debug, Clone)]
#[command(name = "jha-webserver")]
#[command(about = "HTTP API for Job Hazard Analyses, their steps and hazards")]
pub struct Args {
    /// Interface to bind
    #[arg(long, env = "JHA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the HTTP API
    #[arg(long, env = "JHA_PORT", default_value = "5000")]
    pub port: u16,

    /// SQLite database file, or `:memory:`
    #[arg(long, env = "JHA_DATABASE", default_value = "jha.db")]
    pub database: String,

    /// Milliseconds to wait on a locked database before giving up
    #[arg(long, env = "JHA_BUSY_TIMEOUT_MS", default_value = "5000")]
    pub busy_timeout_ms: u64,

    /// Extra attempts for step appends/renumbers after a store conflict
    #[arg(long, env = "JHA_MAX_RETRIES", default_value = "3")]
    pub max_retries: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "JHA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub store: StoreConfig,
    pub log_level: String,
}

impl TryFrom<Args> for ServerConfig {
    type Error = WebServerError;

    fn try_from(args: Args) -> WebServerResult<Self> {
        let bind_address: SocketAddr = format!("{}:{}", args.host, args.port)
            .parse()
            .map_err(|e| WebServerError::config(format!("Invalid bind address: {e}")))?;

        if args.database.trim().is_empty() {
            return Err(WebServerError::config("Database path must not be empty"));
        }

        let store = StoreConfig {
            location: DatabaseLocation::parse(&args.database),
            busy_timeout: Duration::from_millis(args.busy_timeout_ms),
            max_retries: args.max_retries,
        };

        Ok(Self {
            bind_address,
            store,
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Args {
        let argv = std::iter::once("jha-webserver").chain(args.iter().copied());
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_convert() {
        let args = parse(&["--host", "127.0.0.1", "--port", "5000", "--database", "jha.db"]);

        let config = ServerConfig::try_from(args).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.store.location, DatabaseLocation::File(PathBuf::from("jha.db")));
        assert_eq!(config.store.max_retries, 3);
    }

    #[test]
    fn test_overrides_convert() {
        let args = parse(&["--port", "9100", "--database", ":memory:", "--max-retries", "1"]);

        let config = ServerConfig::try_from(args).unwrap();

        assert_eq!(config.bind_address.port(), 9100);
        assert_eq!(config.store.location, DatabaseLocation::Memory);
        assert_eq!(config.store.max_retries, 1);
    }

    #[test]
    fn test_bad_host_is_config_error() {
        let args = parse(&["--host", "not a host"]);

        let result = ServerConfig::try_from(args);

        assert!(matches!(result, Err(WebServerError::Config(_))));
    }
}
