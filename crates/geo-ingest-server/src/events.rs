//! Trigger events
//!
//! A document reaches the pipeline in one of two envelopes: an object-storage
//! upload notification naming the object to fetch, or an API request carrying
//! the document inline in `body`.

use geo_ingest::IngestError;
use serde::Deserialize;
use serde_json::Value;

use crate::storage::ObjectFetcher;

pub const NO_BODY: &str = "no body data in api request";
pub const UNKNOWN_TYPE: &str = "could not determine the csv type";
pub const UNSUPPORTED_TYPE: &str = "unsupported file type";

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerEvent {
    Storage(StorageNotification),
    Api(ApiEnvelope),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageNotification {
    #[serde(rename = "Records")]
    pub records: Vec<StorageRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct S3Object {
    /// URL-encoded as delivered by the notification
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub body: Option<Value>,
}

/// Where the document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Object { bucket: String, key: String },
    Inline(Vec<u8>),
}

impl TriggerEvent {
    /// Classify a raw event; anything carrying `Records` is a storage notification
    pub fn from_slice(raw: &[u8]) -> Result<Self, IngestError> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| IngestError::source_error(format!("invalid event: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, IngestError> {
        if value.get("Records").is_some() {
            serde_json::from_value(value)
                .map(TriggerEvent::Storage)
                .map_err(|e| IngestError::source_error(format!("invalid storage notification: {}", e)))
        } else {
            serde_json::from_value(value)
                .map(TriggerEvent::Api)
                .map_err(|e| IngestError::source_error(format!("invalid api request: {}", e)))
        }
    }

    /// Resolve the event to its document location without fetching anything
    pub fn into_source(self) -> Result<DocumentSource, IngestError> {
        match self {
            TriggerEvent::Storage(notification) => {
                let record = notification
                    .records
                    .into_iter()
                    .next()
                    .ok_or_else(|| IngestError::source_error("no records in storage notification"))?;

                let key = decode_key(&record.s3.object.key)?;
                check_csv_suffix(&key)?;

                Ok(DocumentSource::Object {
                    bucket: record.s3.bucket.name,
                    key,
                })
            },
            TriggerEvent::Api(envelope) => match envelope.body {
                Some(Value::String(text)) => Ok(DocumentSource::Inline(text.into_bytes())),
                Some(other) if !is_blank(&other) => serde_json::to_vec(&other)
                    .map(DocumentSource::Inline)
                    .map_err(|e| IngestError::source_error(format!("invalid api body: {}", e))),
                _ => Err(IngestError::source_error(NO_BODY)),
            },
        }
    }

    /// Resolve and, for storage notifications, download the document
    pub async fn into_document(self, fetcher: &dyn ObjectFetcher) -> Result<Vec<u8>, IngestError> {
        match self.into_source()? {
            DocumentSource::Inline(document) => Ok(document),
            DocumentSource::Object { bucket, key } => fetcher
                .fetch(&bucket, &key)
                .await
                .map_err(|e| IngestError::source_error(format!("{:#}", e))),
        }
    }
}

/// Decode a notification key: `+` is a space, then `%XX` escapes
pub fn decode_key(raw: &str) -> Result<String, IngestError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|key| key.into_owned())
        .map_err(|e| IngestError::source_error(format!("invalid object key {}: {}", raw, e)))
}

/// `null`, `false` and zero carry no document
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn check_csv_suffix(key: &str) -> Result<(), IngestError> {
    match key.rsplit_once('.') {
        None => Err(IngestError::source_error(UNKNOWN_TYPE)),
        Some((_, suffix)) if suffix.eq_ignore_ascii_case("csv") => Ok(()),
        Some(_) => Err(IngestError::source_error(UNSUPPORTED_TYPE)),
    }
}
