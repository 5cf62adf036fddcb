//! Ingestion service: the pipeline plus failure alerts

use std::sync::Arc;
use tracing::{instrument, warn};

use crate::{
    config::IngestConfig,
    error::{IngestError, IngestionResult},
    notify::{self, notify_best_effort, Notifier},
    pipeline::IngestPipeline,
    store::DynamoDbStore,
};

/// Entry point shared by the HTTP adapter and the CLI
#[derive(Clone)]
pub struct IngestService {
    pipeline: IngestPipeline,
    notifier: Arc<dyn Notifier>,
}

impl IngestService {
    pub fn new(pipeline: IngestPipeline, notifier: Arc<dyn Notifier>) -> Self {
        Self { pipeline, notifier }
    }

    /// Wire the DynamoDB store and the configured alert channel
    pub async fn from_config(config: &IngestConfig) -> Self {
        let store = DynamoDbStore::from_config(config).await;
        let pipeline = IngestPipeline::new(Arc::new(store), config.batch_size);
        Self::new(pipeline, notify::from_config(config).await)
    }

    pub fn pipeline(&self) -> &IngestPipeline {
        &self.pipeline
    }

    /// Ingest one document; a failure is alerted before it is returned
    #[instrument(skip_all, fields(bytes = document.len()))]
    pub async fn ingest(&self, document: &[u8]) -> IngestionResult {
        match self.pipeline.run(document).await {
            Ok(summary) => Ok(summary),
            Err(error) => Err(self.reject(error).await),
        }
    }

    /// Alert on a failure raised outside the pipeline and hand it back
    pub async fn reject(&self, error: IngestError) -> IngestError {
        warn!(kind = error.kind().code(), error = %error, "Ingestion failed");
        notify_best_effort(self.notifier.as_ref(), &error.to_string()).await;
        error
    }
}
