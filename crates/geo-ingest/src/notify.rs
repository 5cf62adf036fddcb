//! Failure alerts
//!
//! Alerts are best-effort: a failed publish is logged and otherwise ignored,
//! and never changes the outcome of the request that triggered it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_sns::{error::DisplayErrorContext, Client};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::IngestConfig;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish `message`, returning the channel's message id if it assigns one
    async fn publish(&self, message: &str) -> Result<Option<String>>;
}

/// Publishes to an SNS topic
#[derive(Clone, Debug)]
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }

    pub fn topic_arn(&self) -> &str {
        &self.topic_arn
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, message: &str) -> Result<Option<String>> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(&e)))
            .with_context(|| format!("Failed to publish to {}", self.topic_arn))?;

        Ok(output.message_id().map(str::to_string))
    }
}

/// Writes alerts to the log only; used when no topic is configured
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, message: &str) -> Result<Option<String>> {
        warn!(alert = %message, "No alert topic configured");
        Ok(None)
    }
}

/// SNS when a topic is configured, otherwise the log
pub async fn from_config(config: &IngestConfig) -> Arc<dyn Notifier> {
    match &config.topic_arn {
        Some(topic_arn) => {
            let sdk_config = config.sdk_config().await;
            Arc::new(SnsNotifier::new(Client::new(&sdk_config), topic_arn.clone()))
        },
        None => Arc::new(LogNotifier),
    }
}

/// Publish and swallow any failure
pub async fn notify_best_effort(notifier: &dyn Notifier, message: &str) {
    match notifier.publish(message).await {
        Ok(Some(message_id)) => info!(message_id = %message_id, "Alert published"),
        Ok(None) => {},
        Err(e) => error!(error = ?e, alert = %message, "Failed to publish alert"),
    }
}
