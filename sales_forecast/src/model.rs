//! Model gateway: loading and invoking the trained sales regressor
//!
//! The regressor is a gradient-boosted tree ensemble exported to JSON:
//!
//! ```json
//! {
//!   "feature_names": ["Store", "CompetitionDistance", "..."],
//!   "base_score": 0.0,
//!   "target_transform": "log1p",
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 4, "threshold": 0.5, "left": 1, "right": 2, "default_left": true },
//!         { "leaf": 8.61 },
//!         { "leaf": 8.93 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! A split sends `x <= threshold` left and missing values (`NaN`) to
//! `default_left`. The prediction is `base_score` plus the sum of the reached
//! leaves, passed through `expm1` when the target was trained in log space.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use store_features::{FeatureSchema, FeatureVector};

/// Opaque predictor capability
pub trait SalesModel: Debug + Send + Sync {
    /// Feature names the model was fit on, in column order
    fn feature_names(&self) -> &[String];

    /// Score one row laid out in `feature_names` order
    fn predict_row(&self, row: &[f64]) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Transform applied to the raw ensemble output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetTransform {
    #[default]
    Identity,
    /// Model was trained on `ln(1 + sales)`
    Log1p,
}

impl TargetTransform {
    fn apply(&self, raw: f64) -> f64 {
        match self {
            TargetTransform::Identity => raw,
            TargetTransform::Log1p => raw.exp_m1(),
        }
    }
}

fn default_left() -> bool {
    true
}

/// Tree node: an internal split or a leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default = "default_left")]
        default_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

/// A single regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Children must point strictly forward so traversal always terminates
    fn validate(&self, index: usize, num_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {} has no nodes", index));
        }

        for (position, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } = node
            {
                if *feature >= num_features {
                    return Err(format!(
                        "tree {} node {} splits on feature {} but the model has {} features",
                        index, position, feature, num_features
                    ));
                }
                if threshold.is_nan() {
                    return Err(format!("tree {} node {} has a NaN threshold", index, position));
                }
                for child in [*left, *right] {
                    if child <= position || child >= self.nodes.len() {
                        return Err(format!(
                            "tree {} node {} has invalid child index {}",
                            index, position, child
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { leaf } => return *leaf,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = row[*feature];
                    let go_left = if x.is_nan() {
                        *default_left
                    } else {
                        x <= *threshold
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }
}

/// Gradient-boosted regression tree ensemble
///
/// Deserializing validates the tree structure, so every ensemble in memory
/// evaluates without indexing out of range or looping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnsembleDump")]
pub struct TreeEnsemble {
    feature_names: Vec<String>,
    base_score: f64,
    target_transform: TargetTransform,
    trees: Vec<Tree>,
}

/// On-disk layout, before validation
#[derive(Deserialize)]
struct EnsembleDump {
    feature_names: Vec<String>,
    #[serde(default)]
    base_score: f64,
    #[serde(default)]
    target_transform: TargetTransform,
    trees: Vec<Tree>,
}

impl TryFrom<EnsembleDump> for TreeEnsemble {
    type Error = String;

    fn try_from(dump: EnsembleDump) -> std::result::Result<Self, String> {
        let model = Self {
            feature_names: dump.feature_names,
            base_score: dump.base_score,
            target_transform: dump.target_transform,
            trees: dump.trees,
        };
        model.validate()?;
        Ok(model)
    }
}

impl TreeEnsemble {
    /// Build an ensemble from its parts, validating the tree structure
    pub fn new(
        feature_names: Vec<String>,
        base_score: f64,
        target_transform: TargetTransform,
        trees: Vec<Tree>,
    ) -> Result<Self> {
        let model = Self {
            feature_names,
            base_score,
            target_transform,
            trees,
        };
        model.validate().map_err(ForecastError::SchemaMismatch)?;
        Ok(model)
    }

    /// Load a serialized ensemble from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading sales model from: {}", path.display());

        let text = fs::read_to_string(path).map_err(|e| ForecastError::load(path, e))?;
        let model: TreeEnsemble =
            serde_json::from_str(&text).map_err(|e| ForecastError::load(path, e))?;

        log::info!(
            "Loaded sales model from {} ({} trees, {} features)",
            path.display(),
            model.trees.len(),
            model.feature_names.len()
        );
        Ok(model)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.feature_names.is_empty() {
            return Err("model lists no feature names".to_string());
        }
        if self.trees.is_empty() {
            return Err("model has no trees".to_string());
        }
        if !self.base_score.is_finite() {
            return Err("model base_score is not finite".to_string());
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(index, self.feature_names.len())?;
        }
        Ok(())
    }

    /// Number of boosted trees
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn target_transform(&self) -> TargetTransform {
        self.target_transform
    }
}

impl SalesModel for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.feature_names.len() {
            return Err(ForecastError::PredictError {
                reason: format!(
                    "row has {} values but the model expects {}",
                    row.len(),
                    self.feature_names.len()
                ),
                features: None,
            });
        }

        let raw = self.base_score + self.trees.iter().map(|t| t.evaluate(row)).sum::<f64>();
        Ok(self.target_transform.apply(raw))
    }

    fn name(&self) -> &str {
        "gradient-boosted trees"
    }
}

/// Score a feature vector, laying it out in `schema` order first
///
/// Failures carry the vector so the caller can inspect what was scored.
pub fn predict(model: &dyn SalesModel, vector: &FeatureVector, schema: &FeatureSchema) -> Result<f64> {
    let row = vector
        .project(schema)
        .map_err(|e| ForecastError::predict(format!("incomplete feature vector: {}", e), vector))?;

    log::debug!("Running {} inference on {} features", model.name(), row.len());

    let value = model
        .predict_row(&row)
        .map_err(|e| ForecastError::predict(e.to_string(), vector))?;

    if !value.is_finite() {
        return Err(ForecastError::predict(
            format!("model returned a non-finite value ({})", value),
            vector,
        ));
    }

    Ok(value)
}

/// Initialize-once access to the trained model
///
/// The model is deserialized on first use and shared afterwards; concurrent
/// first calls wait on the same load instead of loading twice.
#[derive(Debug)]
pub struct ModelGateway {
    path: Option<PathBuf>,
    schema: Arc<FeatureSchema>,
    model: OnceLock<Arc<dyn SalesModel>>,
    init: Mutex<()>,
}

impl ModelGateway {
    /// Gateway that loads a [`TreeEnsemble`] from `path` on first use
    pub fn new<P: Into<PathBuf>>(path: P, schema: Arc<FeatureSchema>) -> Self {
        Self {
            path: Some(path.into()),
            schema,
            model: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Gateway around an already constructed model
    pub fn preloaded(model: Arc<dyn SalesModel>, schema: Arc<FeatureSchema>) -> Result<Self> {
        schema.check_names(model.feature_names())?;

        let gateway = Self {
            path: None,
            schema,
            model: OnceLock::new(),
            init: Mutex::new(()),
        };
        // freshly created cell, cannot already be set
        let _ = gateway.model.set(model);
        Ok(gateway)
    }

    /// Schema the model is checked against
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Whether the model has been initialized
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// The shared model, loading it on first call
    pub fn model(&self) -> Result<Arc<dyn SalesModel>> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        // a panic while loading leaves nothing half-initialized behind the lock
        let _guard = self.init.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        let path = self.path.as_ref().ok_or_else(|| {
            ForecastError::load(PathBuf::new(), "no model path configured")
        })?;
        let model: Arc<dyn SalesModel> = Arc::new(TreeEnsemble::load(path)?);
        self.schema
            .check_names(model.feature_names())
            .map_err(|e| ForecastError::SchemaMismatch(format!("{}: {}", path.display(), e)))?;

        let _ = self.model.set(Arc::clone(&model));
        Ok(model)
    }

    /// Score a feature vector with the shared model
    pub fn predict(&self, vector: &FeatureVector) -> Result<f64> {
        let model = self.model()?;
        predict(model.as_ref(), vector, &self.schema)
    }
}
