//! Shared fixtures for geo-ingest integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use geo_ingest::notify::Notifier;
use std::sync::Mutex;

/// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,geo_ingest=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// CSV document with `rows` valid, distinct rows
pub fn locations_csv(rows: usize) -> Vec<u8> {
    let mut csv = String::from("latitude,longitude,address\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "{}.{:04},{}.{:04},\"{} Nathan Rd, Kowloon\"\n",
            22,
            i,
            114,
            i,
            i + 1
        ));
    }
    csv.into_bytes()
}

/// Notifier that remembers every message and can be made to fail
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, message: &str) -> anyhow::Result<Option<String>> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            anyhow::bail!("topic does not exist");
        }
        Ok(Some(format!("msg-{}", self.messages.lock().unwrap().len())))
    }
}
