//! Request service used by the presentation layer
//!
//! One [`SalesForecaster`] is built per process. It owns the shared schema,
//! the model gateway and the history store; each call takes a fresh
//! [`RawInputs`] and returns either a complete prediction or an error.

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::history::{HistoricalRecord, HistoryStore};
use crate::metrics::StoreAccuracy;
use crate::model::{ModelGateway, SalesModel};
use serde::Serialize;
use std::sync::Arc;
use store_features::{derive, FeatureSchema, FeatureVector, InputLimits, RawInputs};

/// A scored request
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Predicted daily sales
    pub sales: f64,
    /// Exact vector that was scored
    pub features: FeatureVector,
}

impl Prediction {
    /// Sales rounded to cents for display
    pub fn rounded_sales(&self) -> f64 {
        round_currency(self.sales)
    }
}

/// Round a monetary amount to 2 decimals
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Debug)]
pub struct SalesForecaster {
    schema: Arc<FeatureSchema>,
    limits: InputLimits,
    gateway: ModelGateway,
    history: HistoryStore,
}

impl SalesForecaster {
    /// Forecaster for a deployment; model and history load lazily on first use
    pub fn new(config: &DashboardConfig) -> Self {
        let schema = Arc::new(FeatureSchema::rossmann());
        Self {
            gateway: ModelGateway::new(config.model.path.clone(), Arc::clone(&schema)),
            history: HistoryStore::new(config.history.path.clone()),
            limits: config.input_limits(),
            schema,
        }
    }

    /// Forecaster around an in-memory model and history
    pub fn with_model(
        model: Arc<dyn SalesModel>,
        history: Vec<HistoricalRecord>,
        limits: InputLimits,
    ) -> Result<Self> {
        let schema = Arc::new(FeatureSchema::rossmann());
        Ok(Self {
            gateway: ModelGateway::preloaded(model, Arc::clone(&schema))?,
            history: HistoryStore::from_records(history),
            limits,
            schema,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn limits(&self) -> &InputLimits {
        &self.limits
    }

    /// Load the model now instead of on the first prediction
    pub fn warm_up(&self) -> Result<()> {
        self.gateway.model().map(|_| ())
    }

    /// Validate, derive and score one request
    pub fn predict(&self, raw: &RawInputs) -> Result<Prediction> {
        self.limits.check(raw)?;
        let features = self.derive_features(raw)?;
        let sales = self.gateway.predict(&features)?;

        log::debug!(
            "Predicted {:.2} for store {} on {}",
            sales,
            raw.store_id,
            raw.date
        );
        Ok(Prediction { sales, features })
    }

    /// The vector a request would be scored with, without scoring it
    pub fn derive_features(&self, raw: &RawInputs) -> Result<FeatureVector> {
        Ok(derive(raw, &self.schema)?)
    }

    /// Scored history of one store, oldest first
    pub fn history_for_store(&self, store_id: u32) -> Vec<HistoricalRecord> {
        self.history.query_by_store(store_id)
    }

    /// MAE/MAPE of the stored predictions for one store
    pub fn store_accuracy(&self, store_id: u32) -> StoreAccuracy {
        StoreAccuracy::for_store(&self.history.records(), store_id)
    }

    /// Stores that have scored history
    pub fn available_stores(&self) -> Vec<u32> {
        self.history.store_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(1234.567), 1234.57);
        assert_eq!(round_currency(1234.564), 1234.56);
        assert_eq!(round_currency(0.0), 0.0);
    }
}
