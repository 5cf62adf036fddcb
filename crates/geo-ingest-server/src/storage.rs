//! Object storage access for upload notifications

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{error::DisplayErrorContext, Client};
use std::{collections::HashMap, sync::Mutex};
use tracing::{debug, instrument};

/// Fetches the full contents of a stored object
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

#[derive(Clone, Debug)]
pub struct S3Fetcher {
    client: Client,
}

impl S3Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }
}

#[async_trait]
impl ObjectFetcher for S3Fetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        debug!("Downloading from s3://{}/{}", bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(&e)))
            .with_context(|| format!("Failed to download s3://{}/{}", bucket, key))?;

        let data = response
            .body
            .collect()
            .await
            .context("Failed to read S3 response body")?
            .into_bytes()
            .to_vec();

        debug!("Downloaded {} bytes from s3://{}/{}", data.len(), bucket, key);

        Ok(data)
    }
}

/// In-process objects keyed by `(bucket, key)`
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(
        self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((bucket.into(), key.into()), data.into());
        self
    }
}

#[async_trait]
impl ObjectFetcher for MemoryFetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| anyhow!("NoSuchKey: s3://{}/{}", bucket, key))
    }
}
