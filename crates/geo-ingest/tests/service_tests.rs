//! Failure alerts raised by the ingestion service

mod common;

use common::{init_tracing, locations_csv, RecordingNotifier};
use geo_ingest::{
    pipeline::IngestPipeline, service::IngestService, store::MemoryStore, FailureKind,
    IngestError,
};
use std::{num::NonZeroUsize, sync::Arc};

fn service(store: MemoryStore, notifier: &Arc<RecordingNotifier>) -> IngestService {
    let pipeline = IngestPipeline::new(Arc::new(store), NonZeroUsize::new(10).unwrap());
    IngestService::new(pipeline, notifier.clone())
}

#[tokio::test]
async fn test_success_sends_no_alert() {
    init_tracing();
    let notifier = Arc::new(RecordingNotifier::default());

    let summary = service(MemoryStore::new("locations"), &notifier)
        .ingest(&locations_csv(3))
        .await
        .unwrap();

    assert_eq!(summary.records, 3);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_invalid_data_is_alerted() {
    init_tracing();
    let notifier = Arc::new(RecordingNotifier::default());

    let err = service(MemoryStore::new("locations"), &notifier)
        .ingest(b"latitude,longitude\n1,2\n")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::InvalidData);
    assert_eq!(notifier.messages(), vec![err.to_string()]);
}

#[tokio::test]
async fn test_write_error_is_alerted() {
    init_tracing();
    let notifier = Arc::new(RecordingNotifier::default());
    let store = MemoryStore::new("locations").leave_unprocessed_on(0, 1);

    let err = service(store, &notifier)
        .ingest(&locations_csv(3))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::WriteError);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("locations unprocessed data in batch 1"));
}

#[tokio::test]
async fn test_alert_failure_does_not_change_result() {
    init_tracing();
    let notifier = Arc::new(RecordingNotifier::failing());

    let err = service(MemoryStore::new("locations"), &notifier)
        .ingest(b"")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::InvalidData);
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_reject_alerts_source_errors() {
    init_tracing();
    let notifier = Arc::new(RecordingNotifier::default());

    let err = service(MemoryStore::new("locations"), &notifier)
        .reject(IngestError::source_error("unsupported file type"))
        .await;

    assert_eq!(err.kind(), FailureKind::WriteError);
    assert_eq!(notifier.messages(), vec!["unsupported file type".to_string()]);
}
