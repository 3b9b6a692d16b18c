//! Metrics for evaluating historical prediction accuracy

use crate::history::{query_by_store, HistoricalRecord};
use serde::Serialize;
use std::fmt;

/// Mean absolute percentage error, or the reason it cannot be computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PercentageError {
    /// MAPE in percent
    Defined(f64),
    /// At least one actual value is zero (or there are no records), so the
    /// percentage error is undefined
    Undefined { zero_actuals: usize },
}

impl PercentageError {
    /// The percentage, when defined
    pub fn value(&self) -> Option<f64> {
        match self {
            PercentageError::Defined(value) => Some(*value),
            PercentageError::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, PercentageError::Defined(_))
    }
}

impl fmt::Display for PercentageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentageError::Defined(value) => write!(f, "{:.2}%", value),
            PercentageError::Undefined { zero_actuals: 0 } => write!(f, "undefined (no records)"),
            PercentageError::Undefined { zero_actuals } => {
                write!(f, "undefined ({} days with zero actual sales)", zero_actuals)
            }
        }
    }
}

/// Mean of |actual - predicted|; `None` for an empty sequence
pub fn mean_absolute_error(records: &[HistoricalRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }

    let sum: f64 = records.iter().map(HistoricalRecord::absolute_error).sum();
    Some(sum / records.len() as f64)
}

/// Mean of |actual - predicted| / actual, in percent
///
/// Any zero actual makes the metric [`PercentageError::Undefined`] rather
/// than silently dropping or dividing by zero.
pub fn mean_absolute_percentage_error(records: &[HistoricalRecord]) -> PercentageError {
    let zero_actuals = records.iter().filter(|r| r.actual_sales == 0.0).count();
    if records.is_empty() || zero_actuals > 0 {
        return PercentageError::Undefined { zero_actuals };
    }

    let sum: f64 = records
        .iter()
        .map(|r| r.absolute_error() / r.actual_sales.abs())
        .sum();
    PercentageError::Defined(sum / records.len() as f64 * 100.0)
}

/// Accuracy summary for one store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreAccuracy {
    pub store_id: u32,
    pub records: usize,
    pub mae: Option<f64>,
    pub mape: PercentageError,
}

impl StoreAccuracy {
    /// Summarize the records of `store_id` out of a mixed sequence
    pub fn for_store(records: &[HistoricalRecord], store_id: u32) -> Self {
        let selected = query_by_store(records, store_id);
        Self {
            store_id,
            records: selected.len(),
            mae: mean_absolute_error(&selected),
            mape: mean_absolute_percentage_error(&selected),
        }
    }
}

impl fmt::Display for StoreAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy for store {} ({} days):", self.store_id, self.records)?;
        match self.mae {
            Some(mae) => writeln!(f, "  MAE:   {:.2}", mae)?,
            None => writeln!(f, "  MAE:   undefined (no records)")?,
        }
        writeln!(f, "  MAPE:  {}", self.mape)?;
        Ok(())
    }
}
