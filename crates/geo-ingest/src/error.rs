//! Terminal errors of an ingestion request

use serde::Serialize;
use thiserror::Error;

use crate::{batch::CoordinateError, schema::SchemaError, store::StoreError};

/// Outcome of one ingestion request
pub type IngestionResult = Result<IngestSummary, IngestError>;

/// What a successful request wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub records: usize,
    pub batches: usize,
}

/// How a failure is reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The input does not conform; resubmitting it unchanged will fail again
    InvalidData,
    /// The backend did not persist everything; resubmission may succeed
    WriteError,
}

impl FailureKind {
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::InvalidData => "INVALID_DATA",
            FailureKind::WriteError => "WRITE_ERROR",
        }
    }

    pub fn status_code(self) -> u16 {
        match self {
            FailureKind::InvalidData => 400,
            FailureKind::WriteError => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    #[error("{table} unprocessed data in batch {batch}: {items}")]
    Unprocessed {
        table: String,
        batch: usize,
        /// JSON rendering of the items the store did not persist
        items: String,
    },

    #[error("write to {table} failed in batch {batch}: {source}")]
    Store {
        table: String,
        batch: usize,
        #[source]
        source: StoreError,
    },

    /// The document could not be obtained from its trigger
    #[error("{0}")]
    Source(String),
}

impl IngestError {
    pub fn source_error(message: impl Into<String>) -> Self {
        IngestError::Source(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            IngestError::Schema(_) | IngestError::Coordinate(_) => FailureKind::InvalidData,
            IngestError::Unprocessed { .. }
            | IngestError::Store { .. }
            | IngestError::Source(_) => FailureKind::WriteError,
        }
    }
}
