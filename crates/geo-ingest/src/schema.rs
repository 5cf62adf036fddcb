//! Tabular input decoding and schema validation
//!
//! A document is decoded into a [`RawTable`] of open column→value mappings,
//! then [`validate`] checks the column set and converts every row into the
//! closed [`LocationRecord`] shape.
//!
//! Only the first row's columns are checked against the expected set. Later
//! rows are converted without a per-row check; a column they lack is read as
//! an empty value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const ADDRESS: &str = "address";

/// Columns every table must carry, in canonical order
pub const EXPECTED_COLUMNS: [&str; 3] = [LATITUDE, LONGITUDE, ADDRESS];

/// One decoded row: column name to raw string value
pub type RawRecord = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("csv data is empty")]
    Empty,

    #[error("column length mismatch: expected {expected} columns, found {found}")]
    ColumnLengthMismatch { expected: usize, found: usize },

    #[error("column name mismatch: expected {expected:?}, found {found:?}")]
    ColumnNameMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("csv data format error: {0}")]
    Csv(#[from] csv::Error),
}

/// Decoded tabular input, one mapping per data row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    records: Vec<RawRecord>,
}

impl RawTable {
    /// Decode comma-separated text whose first line is the header row.
    ///
    /// Blank lines are skipped. A row with a different field count than the
    /// header is a format error. Duplicate header names collapse into one
    /// column holding the right-most value.
    pub fn parse(data: &[u8]) -> Result<Self, SchemaError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .from_reader(data);

        let headers = reader.headers()?.clone();
        let mut records = Vec::new();

        for row in reader.records() {
            let row = row?;
            let record = headers
                .iter()
                .zip(row.iter())
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect();
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn from_records(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A validated row with exactly the three known columns, values still raw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub latitude: String,
    pub longitude: String,
    pub address: String,
}

impl LocationRecord {
    fn from_raw(raw: &RawRecord) -> Self {
        let field = |name: &str| raw.get(name).cloned().unwrap_or_default();
        Self {
            latitude: field(LATITUDE),
            longitude: field(LONGITUDE),
            address: field(ADDRESS),
        }
    }
}

/// Check the table's column set and convert it into typed records.
///
/// The first row stands in for the whole table: its column count must equal
/// the expected count, and its column names, sorted, must equal the expected
/// names sorted the same way.
pub fn validate(table: &RawTable) -> Result<Vec<LocationRecord>, SchemaError> {
    let first = table.records().first().ok_or(SchemaError::Empty)?;

    if first.len() != EXPECTED_COLUMNS.len() {
        return Err(SchemaError::ColumnLengthMismatch {
            expected: EXPECTED_COLUMNS.len(),
            found: first.len(),
        });
    }

    let mut expected: Vec<String> = EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect();
    expected.sort();
    // BTreeMap keys are already in sorted order
    let found: Vec<String> = first.keys().cloned().collect();

    if expected != found {
        return Err(SchemaError::ColumnNameMismatch { expected, found });
    }

    Ok(table.records().iter().map(LocationRecord::from_raw).collect())
}

/// Decode and validate in one step
pub fn parse_and_validate(data: &[u8]) -> Result<Vec<LocationRecord>, SchemaError> {
    validate(&RawTable::parse(data)?)
}
