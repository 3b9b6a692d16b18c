//! # Store Features
//!
//! Feature schema and feature derivation for the store sales model.
//! This crate turns the handful of raw values an analyst supplies (a date,
//! a store, promotion and competition details) into the exact ordered
//! feature vector the trained regressor was fit on.
//!
//! ## Usage Example
//!
//! ```
//! use chrono::NaiveDate;
//! use store_features::{derive, FeatureSchema, RawInputs};
//!
//! let date = NaiveDate::from_ymd_opt(2015, 8, 1).unwrap();
//! let raw = RawInputs::builder(date, 1).competition_distance(100_000.0).build();
//!
//! let schema = FeatureSchema::rossmann();
//! let vector = derive(&raw, &schema).unwrap();
//!
//! assert_eq!(vector.len(), schema.len());
//! assert_eq!(vector.get("HasCompetition"), Some(0.0));
//! assert_eq!(vector.get("Month_8"), Some(1.0));
//! ```

use thiserror::Error;

pub mod calendar;
pub mod derive;
pub mod inputs;
pub mod schema;
pub mod validate;

pub use crate::calendar::CalendarFeatures;
pub use crate::derive::{derive, FeatureVector};
pub use crate::inputs::{
    Assortment, Promo2Since, PromoInterval, RawInputs, RawInputsBuilder, StateHoliday, StoreType,
    YearMonth, NO_COMPETITION_DISTANCE,
};
pub use crate::schema::{FeatureFamily, FeatureKind, FeatureSchema, FeatureSlot};
pub use crate::validate::InputLimits;

/// Errors that can occur while building or validating feature vectors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// The schema names a slot the deriver has no value for
    #[error("Schema mismatch: no value derived for feature slot '{slot}'")]
    SchemaMismatch { slot: String },

    /// The schema itself is malformed (duplicate or empty names)
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A raw input is outside the domain the model was trained on
    #[error("Invalid input '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
}

impl FeatureError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        FeatureError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for feature operations
pub type Result<T> = std::result::Result<T, FeatureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_culprit() {
        let err = FeatureError::SchemaMismatch {
            slot: "Month_13".to_string(),
        };
        assert!(err.to_string().contains("Month_13"));

        let err = FeatureError::invalid_input("store_id", "must be between 1 and 1115");
        assert!(err.to_string().contains("store_id"));
        assert!(err.to_string().contains("1115"));
    }
}
