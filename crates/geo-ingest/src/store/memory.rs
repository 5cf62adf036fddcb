//! In-process record store
//!
//! Keeps items in a map keyed by `id`, the same way the DynamoDB table does,
//! rejects a call that names the same id twice as the backend does, and can
//! be told to misbehave on a given call. Used for dry runs and tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{RecordStore, StoreError, WriteOutcome};
use crate::batch::{Batch, LocationItem};

#[derive(Debug, Clone)]
enum Fault {
    /// Persist all but the last `n` items and report those as unprocessed
    LeaveUnprocessed(usize),
    /// Reject the whole call
    Fail(String),
}

#[derive(Debug, Default)]
struct State {
    items: BTreeMap<String, LocationItem>,
    calls: Vec<Vec<String>>,
    faults: HashMap<usize, Fault>,
}

#[derive(Debug)]
pub struct MemoryStore {
    table: String,
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// On the `call`-th write (0-based), leave the last `count` items unprocessed
    pub fn leave_unprocessed_on(self, call: usize, count: usize) -> Self {
        self.lock().faults.insert(call, Fault::LeaveUnprocessed(count));
        self
    }

    /// On the `call`-th write (0-based), fail the request outright
    pub fn fail_on(self, call: usize, message: impl Into<String>) -> Self {
        self.lock().faults.insert(call, Fault::Fail(message.into()));
        self
    }

    /// Persisted items, ordered by id
    pub fn items(&self) -> Vec<LocationItem> {
        self.lock().items.values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<LocationItem> {
        self.lock().items.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Item ids sent with each write call, in call order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn table_name(&self) -> &str {
        &self.table
    }

    async fn write_batch(&self, batch: &Batch) -> Result<WriteOutcome, StoreError> {
        let mut state = self.lock();
        let call = state.calls.len();
        state.calls.push(batch.ids().map(str::to_string).collect());

        if batch.unique_items().count() < batch.len() {
            return Err(StoreError::Backend(
                "Provided list of item keys contains duplicates".to_string(),
            ));
        }

        let keep = match state.faults.get(&call) {
            Some(Fault::Fail(message)) => return Err(StoreError::Backend(message.clone())),
            Some(Fault::LeaveUnprocessed(count)) => batch.len().saturating_sub(*count),
            None => batch.len(),
        };

        for item in &batch.items()[..keep] {
            state.items.insert(item.id.clone(), item.clone());
        }

        let unprocessed: HashSet<String> = batch.items()[keep..]
            .iter()
            .map(|item| item.id.clone())
            .collect();

        Ok(WriteOutcome::from_unprocessed(batch, &unprocessed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(index: usize, ids: &[&str]) -> Batch {
        Batch::new(
            index,
            ids.iter()
                .map(|id| LocationItem {
                    id: id.to_string(),
                    latitude: 0.0,
                    longitude: 0.0,
                    address: String::new(),
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_writes_are_keyed_by_id() {
        let store = MemoryStore::new("locations");

        assert!(store.write_batch(&batch(0, &["a", "b"])).await.unwrap().is_complete());
        assert!(store.write_batch(&batch(1, &["b", "c"])).await.unwrap().is_complete());

        assert_eq!(store.len(), 3);
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_written_items() {
        let store = MemoryStore::new("locations").leave_unprocessed_on(0, 1);

        let outcome = store.write_batch(&batch(0, &["a", "b", "c"])).await.unwrap();

        assert_eq!(outcome, WriteOutcome::PartialFailure(batch(0, &["c"]).items().to_vec()));
        assert!(store.get("a").is_some());
        assert!(store.get("c").is_none());
    }

    #[tokio::test]
    async fn test_repeated_id_in_one_call_is_rejected() {
        let store = MemoryStore::new("locations");

        let err = store.write_batch(&batch(0, &["a", "b", "a"])).await.unwrap_err();

        assert!(matches!(err, StoreError::Backend(ref m) if m.contains("duplicates")));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_fail_writes_nothing() {
        let store = MemoryStore::new("locations").fail_on(0, "throttled");

        let err = store.write_batch(&batch(0, &["a"])).await.unwrap_err();

        assert!(matches!(err, StoreError::Backend(ref m) if m == "throttled"));
        assert!(store.is_empty());
        assert_eq!(store.calls().len(), 1);
    }
}
