//! Store writer
//!
//! A [`RecordStore`] persists one [`Batch`] per call and reports whether the
//! backend took every item. Items the backend leaves unprocessed are returned
//! to the caller rather than retried here.

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

use crate::batch::{Batch, LocationItem};

pub mod dynamodb;
pub mod memory;

pub use dynamodb::DynamoDbStore;
pub use memory::MemoryStore;

/// A failed store call; nothing is known about which items were written
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend request failed: {0}")]
    Backend(String),

    #[error("could not build write request: {0}")]
    Request(String),
}

/// Result of one bulk write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Every item was persisted
    Complete,
    /// The backend did not persist these items; the rest may have been written
    PartialFailure(Vec<LocationItem>),
}

impl WriteOutcome {
    /// Build the outcome from the ids the backend reported as unprocessed
    pub fn from_unprocessed(batch: &Batch, unprocessed_ids: &HashSet<String>) -> Self {
        if unprocessed_ids.is_empty() {
            return WriteOutcome::Complete;
        }

        WriteOutcome::PartialFailure(
            batch
                .items()
                .iter()
                .filter(|item| unprocessed_ids.contains(&item.id))
                .cloned()
                .collect(),
        )
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, WriteOutcome::Complete)
    }
}

/// Bulk writer for one target table
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Table the items land in
    fn table_name(&self) -> &str;

    /// Write every item of `batch` in a single backend request
    async fn write_batch(&self, batch: &Batch) -> Result<WriteOutcome, StoreError>;
}
