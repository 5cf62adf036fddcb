//! Ingestion configuration

use geo_ingest_common::{env, Error, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default target table.
pub const DEFAULT_TABLE_NAME: &str = "locations";

/// Default AWS region.
pub const DEFAULT_REGION: &str = "ap-east-1";

/// Largest batch DynamoDB accepts in one `BatchWriteItem` call.
pub const MAX_BATCH_SIZE: usize = 25;

/// Default batch size.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(MAX_BATCH_SIZE) {
    Some(size) => size,
    None => unreachable!(),
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Table records are written to
    pub table_name: String,
    /// SNS topic for failure alerts; alerts are only logged when unset
    pub topic_arn: Option<String>,
    /// Items per bulk write
    pub batch_size: NonZeroUsize,
    pub region: String,
    /// Endpoint override for local emulators
    pub endpoint_url: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            topic_arn: None,
            batch_size: DEFAULT_BATCH_SIZE,
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
        }
    }
}

impl IngestConfig {
    /// Load from the environment
    ///
    /// - `GEO_INGEST_TABLE`
    /// - `GEO_INGEST_TOPIC_ARN`
    /// - `GEO_INGEST_BATCH_SIZE`
    /// - `AWS_REGION`
    /// - `GEO_INGEST_AWS_ENDPOINT`
    pub fn from_env() -> Result<Self> {
        let config = Self {
            table_name: env::var_or("GEO_INGEST_TABLE", DEFAULT_TABLE_NAME),
            topic_arn: env::var_opt("GEO_INGEST_TOPIC_ARN"),
            batch_size: env::parse_or("GEO_INGEST_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            region: env::var_or("AWS_REGION", DEFAULT_REGION),
            endpoint_url: env::var_opt("GEO_INGEST_AWS_ENDPOINT"),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(Error::config("Table name cannot be empty"));
        }

        if self.batch_size.get() > MAX_BATCH_SIZE {
            return Err(Error::config(format!(
                "Batch size {} exceeds the backend limit of {}",
                self.batch_size, MAX_BATCH_SIZE
            )));
        }

        if self.region.trim().is_empty() {
            return Err(Error::config("Region cannot be empty"));
        }

        Ok(())
    }

    /// Shared AWS SDK configuration for every client this service builds
    pub async fn sdk_config(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(self.region.clone()));

        if let Some(endpoint) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }
}
