//! geo-ingest HTTP adapter
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Exposes the ingestion service over HTTP. A document arrives either as a
//! raw CSV body or wrapped in a trigger event (object-storage upload
//! notification or API envelope); every outcome is answered with the
//! standard response envelope in [`api::response`].

pub mod api;
pub mod config;
pub mod events;
pub mod middleware;
pub mod storage;

pub use api::{create_router, AppState};
