//! Shared fixtures for the sales_forecast integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use store_features::FeatureSchema;

pub const BASE_SALES: f64 = 5000.0;
pub const PROMO_UPLIFT: f64 = 1500.0;
pub const WEEKEND_DROP: f64 = -800.0;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn rossmann_names() -> Vec<String> {
    FeatureSchema::rossmann().names().map(str::to_string).collect()
}

fn stump(feature: usize, high: f64) -> Value {
    json!({
        "nodes": [
            { "feature": feature, "threshold": 0.5, "left": 1, "right": 2 },
            { "leaf": 0.0 },
            { "leaf": high }
        ]
    })
}

/// Model over `names`: base sales, plus an uplift when Promo is set and a
/// drop on weekends
pub fn model_json(names: &[String]) -> Value {
    let position = |name: &str| names.iter().position(|n| n == name).unwrap();
    json!({
        "feature_names": names,
        "base_score": BASE_SALES,
        "trees": [
            stump(position("Promo"), PROMO_UPLIFT),
            stump(position("IsWeekend"), WEEKEND_DROP)
        ]
    })
}

pub fn write_model(dir: &Path, names: &[String]) -> PathBuf {
    let path = dir.join("rossmann_model.json");
    fs::write(&path, model_json(names).to_string()).unwrap();
    path
}

pub const HISTORY_CSV: &str = "\
Store,Date,Actual_Sales,Predicted_Sales
1,2015-07-03,5000,4800
2,2015-07-01,7000,7100
1,2015-07-01,4000,4400
1,2015-07-02,6000,6000
3,2015-07-01,0,150
3,2015-07-02,3000,2900
";

pub fn write_history(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("rossmann_predictions.csv");
    fs::write(&path, contents).unwrap();
    path
}
