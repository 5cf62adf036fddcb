//! DynamoDB-backed record store
//!
//! Each batch becomes a single `BatchWriteItem` call with one `PutRequest`
//! per distinct item. The table's partition key is `id`.

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::DisplayErrorContext,
    types::{AttributeValue, PutRequest, WriteRequest},
    Client,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, warn};

use super::{RecordStore, StoreError, WriteOutcome};
use crate::batch::{Batch, LocationItem};
use crate::config::IngestConfig;

#[derive(Clone, Debug)]
pub struct DynamoDbStore {
    client: Client,
    table: String,
}

impl DynamoDbStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Build a client from the configured region and endpoint
    pub async fn from_config(config: &IngestConfig) -> Self {
        let sdk_config = config.sdk_config().await;
        Self::new(Client::new(&sdk_config), config.table_name.clone())
    }
}

/// Attribute map for one item: `id` and `address` as strings, coordinates as numbers
pub fn item_attributes(item: &LocationItem) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("id".to_string(), AttributeValue::S(item.id.clone())),
        (
            "latitude".to_string(),
            AttributeValue::N(item.latitude.to_string()),
        ),
        (
            "longitude".to_string(),
            AttributeValue::N(item.longitude.to_string()),
        ),
        ("address".to_string(), AttributeValue::S(item.address.clone())),
    ])
}

fn put_request(item: &LocationItem) -> Result<WriteRequest, StoreError> {
    let put = PutRequest::builder()
        .set_item(Some(item_attributes(item)))
        .build()
        .map_err(|e| StoreError::Request(e.to_string()))?;

    Ok(WriteRequest::builder().put_request(put).build())
}

/// One put per distinct id; the backend rejects a call naming a key twice
pub fn put_requests(batch: &Batch) -> Result<Vec<WriteRequest>, StoreError> {
    batch.unique_items().map(put_request).collect()
}

/// Ids of the put requests the backend handed back
pub fn unprocessed_ids(requests: &[WriteRequest]) -> HashSet<String> {
    requests
        .iter()
        .filter_map(|request| request.put_request())
        .filter_map(|put| put.item().get("id"))
        .filter_map(|id| id.as_s().ok())
        .cloned()
        .collect()
}

#[async_trait]
impl RecordStore for DynamoDbStore {
    fn table_name(&self) -> &str {
        &self.table
    }

    #[instrument(skip(self, batch), fields(table = %self.table, batch = batch.index(), items = batch.len()))]
    async fn write_batch(&self, batch: &Batch) -> Result<WriteOutcome, StoreError> {
        let requests = put_requests(batch)?;

        debug!("Sending BatchWriteItem");

        let output = self
            .client
            .batch_write_item()
            .request_items(&self.table, requests)
            .send()
            .await
            .map_err(|e| StoreError::Backend(DisplayErrorContext(&e).to_string()))?;

        let unprocessed = output
            .unprocessed_items()
            .and_then(|tables| tables.get(&self.table))
            .map(|requests| unprocessed_ids(requests))
            .unwrap_or_default();

        if !unprocessed.is_empty() {
            warn!(unprocessed = unprocessed.len(), "Backend left items unprocessed");
        }

        Ok(WriteOutcome::from_unprocessed(batch, &unprocessed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> LocationItem {
        LocationItem {
            id: "1fbcbe4dbb45bc361479685a54133e35".to_string(),
            latitude: 1.1,
            longitude: -2.25,
            address: "A St".to_string(),
        }
    }

    #[test]
    fn test_item_attributes() {
        let attrs = item_attributes(&item());

        assert_eq!(attrs.len(), 4);
        assert_eq!(
            attrs["id"],
            AttributeValue::S("1fbcbe4dbb45bc361479685a54133e35".to_string())
        );
        assert_eq!(attrs["latitude"], AttributeValue::N("1.1".to_string()));
        assert_eq!(attrs["longitude"], AttributeValue::N("-2.25".to_string()));
        assert_eq!(attrs["address"], AttributeValue::S("A St".to_string()));
    }

    #[test]
    fn test_unprocessed_ids_round_trip_through_requests() {
        let requests = vec![put_request(&item()).unwrap()];
        let ids = unprocessed_ids(&requests);
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("1fbcbe4dbb45bc361479685a54133e35"));
    }

    #[test]
    fn test_put_requests_skip_repeated_ids() {
        let mut other = item();
        other.id = "0cc175b9c0f1b6a831c399e269772661".to_string();
        let batch = Batch::new(0, vec![item(), other, item()]);

        let requests = put_requests(&batch).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(unprocessed_ids(&requests).len(), 2);
    }

    #[test]
    fn test_unprocessed_ids_ignores_non_put_requests() {
        let requests = vec![WriteRequest::builder().build()];
        assert!(unprocessed_ids(&requests).is_empty());
    }
}
