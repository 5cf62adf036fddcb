//! Shared fixtures for server route tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use geo_ingest::{
    notify::Notifier, pipeline::IngestPipeline, service::IngestService, store::MemoryStore,
};
use geo_ingest_server::{config::ServerConfig, create_router, storage::MemoryFetcher, AppState};
use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
};
use tower::ServiceExt;

/// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,geo_ingest_server=debug")),
        )
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, message: &str) -> anyhow::Result<Option<String>> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(None)
    }
}

/// Router over in-process fakes
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn new(store: MemoryStore, fetcher: MemoryFetcher) -> Self {
        Self::with_config(store, fetcher, &ServerConfig::default())
    }

    pub fn with_config(store: MemoryStore, fetcher: MemoryFetcher, config: &ServerConfig) -> Self {
        init_tracing();

        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::default());
        let pipeline = IngestPipeline::new(store.clone(), NonZeroUsize::new(10).unwrap());
        let service = IngestService::new(pipeline, notifier.clone());
        let router = create_router(AppState::new(service, Arc::new(fetcher)), config);

        Self {
            router,
            store,
            notifier,
        }
    }

    pub async fn post(&self, uri: &str, body: impl Into<Body>) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// CSV document with `rows` valid, distinct rows
pub fn locations_csv(rows: usize) -> String {
    let mut csv = String::from("latitude,longitude,address\n");
    for i in 0..rows {
        csv.push_str(&format!("22.{:04},114.{:04},\"{} Queen's Rd\"\n", i, i, i + 1));
    }
    csv
}
