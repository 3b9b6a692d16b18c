//! # Sales Forecast
//!
//! Store-level daily sales prediction backed by a gradient-boosted tree
//! model, plus a retrospective view of how an earlier scoring run compared
//! with actual sales.
//!
//! ## Features
//!
//! - Initialize-once model gateway checked against the feature schema
//! - Prediction requests built from plain [`RawInputs`](store_features::RawInputs)
//! - Historical actual vs predicted results per store
//! - MAE and zero-guarded MAPE accuracy metrics
//! - TOML configuration and a `sales-forecast` command line front end
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use sales_forecast::{DashboardConfig, SalesForecaster};
//! use store_features::{PromoInterval, RawInputs};
//!
//! let config = DashboardConfig::load("sales-forecast.toml")?;
//! let forecaster = SalesForecaster::new(&config);
//!
//! let raw = RawInputs::builder(NaiveDate::from_ymd_opt(2015, 8, 1).unwrap(), 1)
//!     .promo(true)
//!     .promo2(PromoInterval::FebMayAugNov, None)
//!     .build();
//!
//! let prediction = forecaster.predict(&raw)?;
//! println!("Predicted sales: {:.2}", prediction.rounded_sales());
//!
//! println!("{}", forecaster.store_accuracy(1));
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod model;
pub mod service;

// Re-export commonly used types
pub use crate::config::DashboardConfig;
pub use crate::error::{ForecastError, Result};
pub use crate::history::{load_history, query_by_store, HistoricalRecord, HistoryStore};
pub use crate::metrics::{
    mean_absolute_error, mean_absolute_percentage_error, PercentageError, StoreAccuracy,
};
pub use crate::model::{predict, ModelGateway, SalesModel, TargetTransform, TreeEnsemble};
pub use crate::service::{round_currency, Prediction, SalesForecaster};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
