//! Pipeline orchestrator
//!
//! One request moves through validation, batching, and sequential batch
//! writes. The first unrecoverable failure ends the request: later batches
//! are never attempted and earlier ones stay written. Retrying is left to
//! the caller, who resubmits the whole document; content-derived ids make
//! the rewrite of already-stored rows idempotent.

use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::{
    batch::{build_batches, Batch},
    error::{IngestError, IngestSummary, IngestionResult},
    schema,
    store::{RecordStore, WriteOutcome},
};

#[derive(Clone)]
pub struct IngestPipeline {
    store: Arc<dyn RecordStore>,
    batch_size: NonZeroUsize,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn RecordStore>, batch_size: NonZeroUsize) -> Self {
        Self { store, batch_size }
    }

    pub fn table_name(&self) -> &str {
        self.store.table_name()
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    /// Validate the document and cut it into batches without writing anything
    pub fn prepare(&self, document: &[u8]) -> Result<Vec<Batch>, IngestError> {
        debug!(bytes = document.len(), "Validating document");
        let records = schema::parse_and_validate(document)?;

        debug!(records = records.len(), "Building batches");
        Ok(build_batches(records, self.batch_size)?)
    }

    /// Run one request end to end
    #[instrument(skip_all, fields(table = %self.table_name(), bytes = document.len()))]
    pub async fn run(&self, document: &[u8]) -> IngestionResult {
        let batches = self.prepare(document)?;
        let records = batches.iter().map(Batch::len).sum();
        let total = batches.len();

        info!(records, batches = total, "Writing batches");

        for batch in &batches {
            self.write(batch, total).await?;
        }

        info!(records, batches = total, "Ingestion complete");

        Ok(IngestSummary {
            records,
            batches: total,
        })
    }

    async fn write(&self, batch: &Batch, total: usize) -> Result<(), IngestError> {
        let position = batch.index() + 1;
        let unique = batch.deduplicated();
        if unique.len() < batch.len() {
            debug!(
                batch = position,
                repeated = batch.len() - unique.len(),
                "Skipping rows repeated within the batch"
            );
        }
        debug!(batch = position, of = total, items = unique.len(), "Writing batch");

        match self.store.write_batch(&unique).await {
            Ok(WriteOutcome::Complete) => Ok(()),
            Ok(WriteOutcome::PartialFailure(unprocessed)) => {
                let items = serde_json::to_string(&unprocessed)
                    .unwrap_or_else(|e| format!("<{} items: {}>", unprocessed.len(), e));

                error!(
                    batch = position,
                    of = total,
                    unprocessed = unprocessed.len(),
                    "Store left items unprocessed, abandoning remaining batches"
                );

                Err(IngestError::Unprocessed {
                    table: self.table_name().to_string(),
                    batch: position,
                    items,
                })
            },
            Err(source) => {
                error!(
                    batch = position,
                    of = total,
                    error = %source,
                    "Batch write failed, abandoning remaining batches"
                );

                Err(IngestError::Store {
                    table: self.table_name().to_string(),
                    batch: position,
                    source,
                })
            },
        }
    }
}
