//! Record identity and write batching
//!
//! Each validated record gets a content-derived `id`: the MD5 of its
//! canonical JSON form, computed over the raw string values before numeric
//! coercion. The canonical form fixes the key order to
//! `latitude, longitude, address` so the same content always hashes the
//! same way.

use serde::Serialize;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use thiserror::Error;

use crate::schema::{LocationRecord, LATITUDE, LONGITUDE};

/// A coordinate that could not be read as a finite number
#[derive(Debug, Error)]
#[error("row {row}: {column} is not a number: {value:?}")]
pub struct CoordinateError {
    /// 1-based data row (the header row is not counted)
    pub row: usize,
    pub column: &'static str,
    pub value: String,
}

/// A record ready to persist, keyed by its content hash
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationItem {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl LocationItem {
    /// Derive the id from the raw record, then coerce the coordinates.
    pub fn identify(row: usize, record: LocationRecord) -> Result<Self, CoordinateError> {
        let id = content_id(&record);
        let latitude = coerce(row, LATITUDE, &record.latitude)?;
        let longitude = coerce(row, LONGITUDE, &record.longitude)?;

        Ok(Self {
            id,
            latitude,
            longitude,
            address: record.address,
        })
    }
}

/// Canonical serialization of a record: compact JSON, fixed key order
pub fn canonical_json(record: &LocationRecord) -> String {
    // Value's Display impl escapes strings exactly as serde_json does
    let quote = |s: &str| serde_json::Value::String(s.to_string()).to_string();
    format!(
        "{{\"latitude\":{},\"longitude\":{},\"address\":{}}}",
        quote(&record.latitude),
        quote(&record.longitude),
        quote(&record.address)
    )
}

/// Content hash used as the storage key
pub fn content_id(record: &LocationRecord) -> String {
    format!("{:x}", md5::compute(canonical_json(record).as_bytes()))
}

fn coerce(row: usize, column: &'static str, value: &str) -> Result<f64, CoordinateError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoordinateError {
            row,
            column,
            value: value.to_string(),
        })
}

/// An ordered slice of items written with a single store call
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    index: usize,
    items: Vec<LocationItem>,
}

impl Batch {
    pub fn new(index: usize, items: Vec<LocationItem>) -> Self {
        Self { index, items }
    }

    /// Position of this batch within its request, starting at 0
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn items(&self) -> &[LocationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    /// Items in order, skipping any whose id already appeared
    pub fn unique_items(&self) -> impl Iterator<Item = &LocationItem> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .filter(move |item| seen.insert(item.id.as_str()))
    }

    /// The same batch with repeated ids dropped
    ///
    /// Equal ids mean equal content, so nothing is lost. Bulk writes reject a
    /// request that names the same key twice.
    pub fn deduplicated(&self) -> Batch {
        Batch::new(self.index, self.unique_items().cloned().collect())
    }
}

/// Identify every record and split them into consecutive batches.
///
/// All batches hold exactly `batch_size` items except the last, which holds
/// the remainder. Order is preserved. Coercion runs over every record before
/// any batch is returned, so a bad coordinate anywhere fails the whole
/// request before anything is written.
pub fn build_batches(
    records: Vec<LocationRecord>,
    batch_size: NonZeroUsize,
) -> Result<Vec<Batch>, CoordinateError> {
    let items = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| LocationItem::identify(i + 1, record))
        .collect::<Result<Vec<_>, _>>()?;

    let size = batch_size.get();
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut remaining = items.into_iter().peekable();

    while remaining.peek().is_some() {
        let chunk: Vec<LocationItem> = remaining.by_ref().take(size).collect();
        batches.push(Batch::new(batches.len(), chunk));
    }

    Ok(batches)
}
