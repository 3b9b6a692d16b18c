//! Dashboard configuration
//!
//! ```toml
//! [model]
//! path = "models/rossmann_model.json"
//!
//! [history]
//! path = "data/rossmann_predictions.csv"
//!
//! [stores]
//! max_store_id = 1115
//! ```
//!
//! Every section is optional. Relative paths are resolved against the
//! directory holding the configuration file.

use crate::error::{ForecastError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use store_features::InputLimits;

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub stores: StoresConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/rossmann_model.json")
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_history_path() -> PathBuf {
    PathBuf::from("data/rossmann_predictions.csv")
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StoresConfig {
    #[serde(default = "default_max_store_id")]
    pub max_store_id: u32,
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            max_store_id: default_max_store_id(),
        }
    }
}

fn default_max_store_id() -> u32 {
    1115
}

impl DashboardConfig {
    /// Parse a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading configuration from: {}", path.display());
        let text = fs::read_to_string(path)?;

        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse configuration text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: DashboardConfig = toml::from_str(text)?;
        if config.stores.max_store_id == 0 {
            return Err(ForecastError::ConfigError(
                "stores.max_store_id must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.model.path.is_relative() {
            self.model.path = base.join(&self.model.path);
        }
        if self.history.path.is_relative() {
            self.history.path = base.join(&self.history.path);
        }
    }

    /// Input bounds for this deployment
    pub fn input_limits(&self) -> InputLimits {
        InputLimits::with_max_store_id(self.stores.max_store_id)
    }
}
