//! geo-ingest common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, environment configuration helpers, and logging
//! setup used by the `geo-ingest` core and the `geo-ingest-server` adapter.
//!
//! # Example
//!
//! ```no_run
//! use geo_ingest_common::{env, logging::{init_logging, LogConfig}};
//!
//! fn main() -> anyhow::Result<()> {
//!     env::load_dotenv();
//!     init_logging(&LogConfig::from_env()?)?;
//!     let table: String = env::var_or("GEO_INGEST_TABLE", "locations");
//!     tracing::info!(table = %table, "configured");
//!     Ok(())
//! }
//! ```

pub mod env;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
