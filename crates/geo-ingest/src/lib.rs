//! geo-ingest core library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads CSV documents of geographic locations into a key-value table.
//!
//! # Pipeline
//!
//! 1. **Schema** ([`schema`]): decode the CSV and check that its columns are
//!    exactly `latitude`, `longitude`, `address` (any order).
//! 2. **Batching** ([`batch`]): give each row a content-hash `id`, coerce the
//!    coordinates to numbers, and cut the rows into fixed-size batches.
//! 3. **Writing** ([`store`]): write batches one at a time; the first batch
//!    the store does not fully accept fails the request.
//!
//! [`service::IngestService`] wraps the [`pipeline::IngestPipeline`] and
//! publishes a best-effort alert ([`notify`]) for every failure.
//!
//! # Example
//!
//! ```no_run
//! use geo_ingest::{config::IngestConfig, service::IngestService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::from_env()?;
//!     let service = IngestService::from_config(&config).await;
//!
//!     let summary = service
//!         .ingest(b"latitude,longitude,address\n22.28,114.16,\"Central\"\n")
//!         .await?;
//!     println!("{} records in {} batches", summary.records, summary.batches);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod schema;
pub mod service;
pub mod store;

pub use error::{FailureKind, IngestError, IngestSummary, IngestionResult};
