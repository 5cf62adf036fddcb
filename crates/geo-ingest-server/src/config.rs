//! Configuration management

use geo_ingest::config::IngestConfig;
use geo_ingest_common::{env, Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default request body limit (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Largest request body accepted on the ingest routes
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load from `GEO_INGEST_HOST`, `GEO_INGEST_PORT`,
    /// `GEO_INGEST_SHUTDOWN_TIMEOUT` and `GEO_INGEST_MAX_BODY_BYTES`
    pub fn from_env() -> Result<Self> {
        let config = Self {
            host: env::var_or("GEO_INGEST_HOST", DEFAULT_SERVER_HOST),
            port: env::parse_or("GEO_INGEST_PORT", DEFAULT_SERVER_PORT)?,
            shutdown_timeout_secs: env::parse_or(
                "GEO_INGEST_SHUTDOWN_TIMEOUT",
                DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            )?,
            max_body_bytes: env::parse_or("GEO_INGEST_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::config("Server port must be greater than 0"));
        }

        if self.max_body_bytes == 0 {
            return Err(Error::config("Body limit must be greater than 0"));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from `.env`, the environment and defaults
    pub fn load() -> Result<Self> {
        env::load_dotenv();

        Ok(Self {
            server: ServerConfig::from_env()?,
            ingest: IngestConfig::from_env()?,
        })
    }
}
