//! Feature derivation
//!
//! [`derive`] maps [`RawInputs`] to the [`FeatureVector`] the sales model
//! expects. The mapping has to match the preprocessing used at training
//! time exactly: a drifted slot does not raise anywhere downstream, it
//! just yields a wrong prediction.

use crate::calendar::CalendarFeatures;
use crate::inputs::{
    Assortment, PromoInterval, RawInputs, StateHoliday, StoreType, NO_COMPETITION_DISTANCE,
};
use crate::schema::{FeatureFamily, FeatureSchema};
use crate::{FeatureError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Ordered feature values for one prediction request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Slot names in model order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Slot values in model order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of a named slot
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    /// Iterate `(name, value)` pairs in model order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values laid out in `schema` order
    pub fn project(&self, schema: &FeatureSchema) -> Result<Vec<f64>> {
        schema
            .names()
            .map(|name| {
                self.get(name).ok_or_else(|| FeatureError::SchemaMismatch {
                    slot: name.to_string(),
                })
            })
            .collect()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "  {:<32} {}", name, value)?;
        }
        Ok(())
    }
}

/// Derive the feature vector for `raw`, laid out in `schema` order
///
/// Fails with [`FeatureError::SchemaMismatch`] when the schema names a slot
/// this deriver does not produce.
pub fn derive(raw: &RawInputs, schema: &FeatureSchema) -> Result<FeatureVector> {
    let computed = compute(raw);
    assemble(&computed, schema)
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Zero every indicator of the family, then raise the one for `active`
fn one_hot<'a>(
    features: &mut HashMap<String, f64>,
    family: FeatureFamily,
    labels: impl IntoIterator<Item = &'a str>,
    active: &str,
) {
    for label in labels {
        features.insert(family.slot_name(label), 0.0);
    }
    features.insert(family.slot_name(active), 1.0);
}

fn compute(raw: &RawInputs) -> HashMap<String, f64> {
    let cal = CalendarFeatures::from_date(raw.date);
    let mut features = HashMap::with_capacity(64);

    let (open_month, open_year) = raw
        .competition_open_since
        .map(|since| (since.month() as f64, since.year() as f64))
        .unwrap_or((0.0, 0.0));
    let (promo2_week, promo2_year) = raw
        .promo2_since
        .map(|since| (since.week as f64, since.year as f64))
        .unwrap_or((0.0, 0.0));

    features.insert("Store".to_string(), raw.store_id as f64);
    features.insert("CompetitionDistance".to_string(), raw.competition_distance);
    features.insert("CompetitionOpenSinceMonth".to_string(), open_month);
    features.insert("CompetitionOpenSinceYear".to_string(), open_year);
    features.insert("Promo".to_string(), flag(raw.promo));
    features.insert("Promo2".to_string(), flag(raw.promo2));
    features.insert("Promo2SinceWeek".to_string(), promo2_week);
    features.insert("Promo2SinceYear".to_string(), promo2_year);

    features.insert("Year".to_string(), cal.year as f64);
    features.insert("IsWeekend".to_string(), flag(cal.is_weekend));
    features.insert("IsStartOfMonth".to_string(), flag(cal.is_start_of_month));
    features.insert("IsEndOfMonth".to_string(), flag(cal.is_end_of_month));
    features.insert("DayOfYear".to_string(), cal.day_of_year as f64);
    features.insert("Quarter".to_string(), cal.quarter as f64);

    features.insert(
        "HasCompetition".to_string(),
        flag(raw.competition_distance != NO_COMPETITION_DISTANCE),
    );
    features.insert(
        "DateCompetition".to_string(),
        competition_days(raw) as f64,
    );

    let interval = effective_interval(raw);
    features.insert(
        "IsPromo2ActiveMonth".to_string(),
        flag(raw.promo2 && interval.contains_month(cal.month)),
    );

    one_hot(
        &mut features,
        FeatureFamily::StoreType,
        StoreType::ALL.iter().map(|v| v.code()),
        raw.store_type.code(),
    );
    one_hot(
        &mut features,
        FeatureFamily::Assortment,
        Assortment::ALL.iter().map(|v| v.code()),
        raw.assortment.code(),
    );
    one_hot(
        &mut features,
        FeatureFamily::StateHoliday,
        StateHoliday::ALL.iter().map(|v| v.code()),
        raw.state_holiday.code(),
    );
    one_hot(
        &mut features,
        FeatureFamily::SchoolHoliday,
        ["0", "1"],
        if raw.school_holiday { "1" } else { "0" },
    );

    let days: Vec<String> = (1..=7).map(|d| d.to_string()).collect();
    one_hot(
        &mut features,
        FeatureFamily::DayOfWeek,
        days.iter().map(String::as_str),
        &cal.day_of_week.to_string(),
    );
    let months: Vec<String> = (1..=12).map(|m| m.to_string()).collect();
    one_hot(
        &mut features,
        FeatureFamily::Month,
        months.iter().map(String::as_str),
        &cal.month.to_string(),
    );

    one_hot(
        &mut features,
        FeatureFamily::PromoInterval,
        PromoInterval::ALL.iter().map(|v| v.code()),
        interval.code(),
    );

    features
}

/// Interval that actually applies: none unless Promo2 is running
fn effective_interval(raw: &RawInputs) -> PromoInterval {
    if raw.promo2 {
        raw.promo_interval
    } else {
        PromoInterval::None
    }
}

/// Signed days from the competitor's opening month to the prediction date
fn competition_days(raw: &RawInputs) -> i64 {
    match raw.competition_open_since {
        Some(since) => raw
            .date
            .signed_duration_since(since.first_day())
            .num_days(),
        None => 0,
    }
}

fn assemble(computed: &HashMap<String, f64>, schema: &FeatureSchema) -> Result<FeatureVector> {
    let mut names = Vec::with_capacity(schema.len());
    let mut values = Vec::with_capacity(schema.len());

    for slot in schema.slots() {
        let value = computed
            .get(slot.name())
            .copied()
            .ok_or_else(|| FeatureError::SchemaMismatch {
                slot: slot.name().to_string(),
            })?;
        names.push(slot.name().to_string());
        values.push(value);
    }

    Ok(FeatureVector { names, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{Promo2Since, YearMonth};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_competition_days_signed() {
        let raw = RawInputs::builder(date(2015, 8, 1), 1)
            .competition_open_since(Some(YearMonth::new(2015, 7).unwrap()))
            .build();
        assert_eq!(competition_days(&raw), 31);

        let raw = RawInputs::builder(date(2015, 8, 1), 1)
            .competition_open_since(Some(YearMonth::new(2015, 9).unwrap()))
            .build();
        assert_eq!(competition_days(&raw), -31);

        let raw = RawInputs::builder(date(2015, 8, 1), 1).build();
        assert_eq!(competition_days(&raw), 0);
    }

    #[test]
    fn test_promo2_month_activity() {
        let raw = RawInputs::builder(date(2015, 8, 12), 1)
            .promo2(PromoInterval::FebMayAugNov, Promo2Since::from_form(10, 2013))
            .build();
        let v = derive(&raw, &FeatureSchema::rossmann()).unwrap();
        assert_eq!(v.get("IsPromo2ActiveMonth"), Some(1.0));
        assert_eq!(v.get("PromoInterval_Feb_May_Aug_Nov"), Some(1.0));
        assert_eq!(v.get("PromoInterval_None"), Some(0.0));
        assert_eq!(v.get("Promo2SinceWeek"), Some(10.0));
        assert_eq!(v.get("Promo2SinceYear"), Some(2013.0));

        let raw = RawInputs::builder(date(2015, 9, 12), 1)
            .promo2(PromoInterval::MarJunSeptDec, None)
            .build();
        let v = derive(&raw, &FeatureSchema::rossmann()).unwrap();
        assert_eq!(v.get("IsPromo2ActiveMonth"), Some(1.0));
    }

    #[test]
    fn test_promo2_without_interval() {
        let raw = RawInputs::builder(date(2015, 8, 12), 1)
            .promo2(PromoInterval::None, None)
            .build();
        let v = derive(&raw, &FeatureSchema::rossmann()).unwrap();
        assert_eq!(v.get("Promo2"), Some(1.0));
        assert_eq!(v.get("IsPromo2ActiveMonth"), Some(0.0));
        assert_eq!(v.get("PromoInterval_None"), Some(1.0));
    }

    #[test]
    fn test_unknown_slot_is_schema_mismatch() {
        let schema = FeatureSchema::from_names(["Store", "WeekOfYear"]).unwrap();
        let raw = RawInputs::builder(date(2015, 8, 1), 1).build();
        let err = derive(&raw, &schema).unwrap_err();
        assert_eq!(
            err,
            FeatureError::SchemaMismatch {
                slot: "WeekOfYear".to_string()
            }
        );
    }

    #[test]
    fn test_subset_schema_keeps_its_order() {
        let schema = FeatureSchema::from_names(["Year", "Store", "Month_8"]).unwrap();
        let raw = RawInputs::builder(date(2015, 8, 1), 42).build();
        let v = derive(&raw, &schema).unwrap();
        assert_eq!(v.values(), &[2015.0, 42.0, 1.0]);
        assert_eq!(v.project(&schema).unwrap(), vec![2015.0, 42.0, 1.0]);
    }

    #[test]
    fn test_project_reports_missing_slot() {
        let small = FeatureSchema::from_names(["Store"]).unwrap();
        let raw = RawInputs::builder(date(2015, 8, 1), 42).build();
        let v = derive(&raw, &small).unwrap();
        let err = v.project(&FeatureSchema::rossmann()).unwrap_err();
        assert!(err.to_string().contains("CompetitionDistance"));
    }
}
