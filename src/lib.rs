//! # Sales Dashboard
//!
//! Single-store daily sales forecasting for the Rossmann store network.
//!
//! The workspace is split in two:
//!
//! - [`features`] (`store_features`): the feature schema and the pure
//!   deriver that turns raw dashboard inputs into the model's feature vector
//! - [`forecast`] (`sales_forecast`): the model gateway, historical results,
//!   accuracy metrics, configuration and the `sales-forecast` binary
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use sales_dashboard::features::{derive, FeatureSchema, RawInputs};
//!
//! let raw = RawInputs::builder(NaiveDate::from_ymd_opt(2015, 8, 1).unwrap(), 1).build();
//! let vector = derive(&raw, &FeatureSchema::rossmann()).unwrap();
//! assert_eq!(vector.get("IsWeekend"), Some(1.0));
//! ```

pub use sales_forecast as forecast;
pub use store_features as features;

pub use sales_forecast::{DashboardConfig, ForecastError, Prediction, SalesForecaster};
pub use store_features::{FeatureSchema, FeatureVector, RawInputs};

/// Summary line for a scored request, as shown to analysts
pub fn describe_prediction(raw: &RawInputs, prediction: &Prediction) -> String {
    format!(
        "Predicted sales for store {} on {}: {:.2}",
        raw.store_id,
        raw.date,
        prediction.rounded_sales()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_schema_reexport() {
        let schema = FeatureSchema::rossmann();
        assert_eq!(schema.len(), 53);
        assert_eq!(schema.names().last(), Some("Year"));
    }

    #[test]
    fn test_describe_prediction() {
        let raw = RawInputs::builder(NaiveDate::from_ymd_opt(2015, 8, 1).unwrap(), 7).build();
        let features = features::derive(&raw, &FeatureSchema::rossmann()).unwrap();
        let prediction = Prediction {
            sales: 4321.006,
            features,
        };
        assert_eq!(
            describe_prediction(&raw, &prediction),
            "Predicted sales for store 7 on 2015-08-01: 4321.01"
        );
    }
}
