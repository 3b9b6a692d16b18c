//! Historical results: previously scored actual vs predicted sales
//!
//! The results file is a CSV export of a batch scoring run with at least the
//! columns `Store`, `Date`, `Actual_Sales` and `Predicted_Sales`. It is only
//! read for retrospective display and never feeds the prediction path.

use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

/// Date layouts accepted in the `Date` column
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One scored store-day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    #[serde(rename = "Store")]
    pub store_id: u32,
    #[serde(rename = "Date", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(rename = "Actual_Sales")]
    pub actual_sales: f64,
    #[serde(rename = "Predicted_Sales")]
    pub predicted_sales: f64,
}

impl HistoricalRecord {
    /// Absolute prediction error
    pub fn absolute_error(&self) -> f64 {
        (self.actual_sales - self.predicted_sales).abs()
    }
}

/// Parse a calendar date, dropping any time-of-day part
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognized date '{}'", raw)))
}

/// Read every record from a results CSV
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<Vec<HistoricalRecord>> {
    let path = path.as_ref();
    log::debug!("Loading historical results from: {}", path.display());

    let file = File::open(path).map_err(|e| ForecastError::load(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<HistoricalRecord>().enumerate() {
        // header is line 1
        let record = row.map_err(|e| ForecastError::load(path, format!("line {}: {}", i + 2, e)))?;
        records.push(record);
    }

    log::info!(
        "Loaded {} historical records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Records of one store, oldest first
pub fn query_by_store(records: &[HistoricalRecord], store_id: u32) -> Vec<HistoricalRecord> {
    let mut selected: Vec<HistoricalRecord> = records
        .iter()
        .filter(|record| record.store_id == store_id)
        .cloned()
        .collect();
    selected.sort_by_key(|record| record.date);
    selected
}

/// Distinct store ids present in the records, ascending
pub fn store_ids(records: &[HistoricalRecord]) -> Vec<u32> {
    records
        .iter()
        .map(|record| record.store_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Initialize-once cache of the historical results
///
/// A missing or corrupt file is not fatal: the store reports no history and
/// retrospective views are simply empty.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    records: OnceLock<Arc<Vec<HistoricalRecord>>>,
    init: Mutex<()>,
}

impl HistoryStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            records: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Store around records that are already in memory
    pub fn from_records(records: Vec<HistoricalRecord>) -> Self {
        let store = Self::new(PathBuf::new());
        // freshly created cell, cannot already be set
        let _ = store.records.set(Arc::new(records));
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records; empty when the file could not be loaded
    pub fn records(&self) -> Arc<Vec<HistoricalRecord>> {
        if let Some(records) = self.records.get() {
            return Arc::clone(records);
        }

        let _guard = self.init.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(records) = self.records.get() {
            return Arc::clone(records);
        }

        let records = match load_history(&self.path) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Historical results unavailable, continuing without history: {}", e);
                Vec::new()
            }
        };
        let records = Arc::new(records);
        let _ = self.records.set(Arc::clone(&records));
        records
    }

    /// Whether any history is available
    pub fn has_history(&self) -> bool {
        !self.records().is_empty()
    }

    /// Records of one store, oldest first
    pub fn query_by_store(&self, store_id: u32) -> Vec<HistoricalRecord> {
        query_by_store(&self.records(), store_id)
    }

    /// Stores that have history
    pub fn store_ids(&self) -> Vec<u32> {
        store_ids(&self.records())
    }
}
