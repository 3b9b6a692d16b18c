//! Input bounds checked before derivation
//!
//! The deriver itself accepts any well-formed [`RawInputs`]; these limits
//! reject values outside the ranges the dashboard offers (and the model saw).

use crate::inputs::RawInputs;
use crate::{FeatureError, Result};
use serde::{Deserialize, Serialize};

/// Accepted ranges for raw inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputLimits {
    /// Highest store id (store ids start at 1)
    pub max_store_id: u32,
    pub min_competition_distance: f64,
    pub max_competition_distance: f64,
    /// Earliest year accepted for competition/promo start dates
    pub min_since_year: i32,
    /// Latest year accepted for competition/promo start dates
    pub max_since_year: i32,
    pub max_promo2_week: u32,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_store_id: 1115,
            min_competition_distance: 20.0,
            max_competition_distance: 100_000.0,
            min_since_year: 1900,
            max_since_year: 2015,
            max_promo2_week: 52,
        }
    }
}

impl InputLimits {
    /// Limits with a different store count
    pub fn with_max_store_id(max_store_id: u32) -> Self {
        Self {
            max_store_id,
            ..Self::default()
        }
    }

    /// Reject inputs outside the accepted ranges
    pub fn check(&self, raw: &RawInputs) -> Result<()> {
        if raw.store_id == 0 || raw.store_id > self.max_store_id {
            return Err(FeatureError::invalid_input(
                "store_id",
                format!(
                    "must be between 1 and {}, got {}",
                    self.max_store_id, raw.store_id
                ),
            ));
        }

        let distance = raw.competition_distance;
        if !distance.is_finite()
            || distance < self.min_competition_distance
            || distance > self.max_competition_distance
        {
            return Err(FeatureError::invalid_input(
                "competition_distance",
                format!(
                    "must be between {} and {} meters, got {}",
                    self.min_competition_distance, self.max_competition_distance, distance
                ),
            ));
        }

        if let Some(since) = raw.competition_open_since {
            self.check_year("competition_open_since", since.year())?;
        }

        if let Some(since) = raw.promo2_since {
            if since.week == 0 || since.week > self.max_promo2_week {
                return Err(FeatureError::invalid_input(
                    "promo2_since",
                    format!(
                        "week must be between 1 and {}, got {}",
                        self.max_promo2_week, since.week
                    ),
                ));
            }
            self.check_year("promo2_since", since.year)?;
        }

        Ok(())
    }

    fn check_year(&self, field: &str, year: i32) -> Result<()> {
        if year < self.min_since_year || year > self.max_since_year {
            return Err(FeatureError::invalid_input(
                field,
                format!(
                    "year must be between {} and {}, got {}",
                    self.min_since_year, self.max_since_year, year
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{Promo2Since, PromoInterval, YearMonth};
    use chrono::NaiveDate;

    fn raw(store_id: u32) -> RawInputs {
        RawInputs::builder(NaiveDate::from_ymd_opt(2015, 8, 1).unwrap(), store_id).build()
    }

    #[test]
    fn test_store_range() {
        let limits = InputLimits::default();
        assert!(limits.check(&raw(1)).is_ok());
        assert!(limits.check(&raw(1115)).is_ok());
        assert!(limits.check(&raw(0)).is_err());
        assert!(limits.check(&raw(1116)).is_err());
        assert!(InputLimits::with_max_store_id(2000).check(&raw(1116)).is_ok());
    }

    #[test]
    fn test_distance_range() {
        let limits = InputLimits::default();
        let mut inputs = raw(1);

        inputs.competition_distance = 100_000.0;
        assert!(limits.check(&inputs).is_ok());
        inputs.competition_distance = 10.0;
        assert!(limits.check(&inputs).is_err());
        inputs.competition_distance = f64::NAN;
        assert!(limits.check(&inputs).is_err());
    }

    #[test]
    fn test_since_dates() {
        let limits = InputLimits::default();
        let date = NaiveDate::from_ymd_opt(2015, 8, 1).unwrap();

        let ok = RawInputs::builder(date, 1)
            .competition_open_since(Some(YearMonth::new(2008, 9).unwrap()))
            .promo2(PromoInterval::JanAprJulOct, Some(Promo2Since { week: 13, year: 2010 }))
            .build();
        assert!(limits.check(&ok).is_ok());

        let late = RawInputs::builder(date, 1)
            .competition_open_since(Some(YearMonth::new(2016, 1).unwrap()))
            .build();
        let err = limits.check(&late).unwrap_err();
        assert!(err.to_string().contains("competition_open_since"));

        let bad_week = RawInputs::builder(date, 1)
            .promo2(PromoInterval::JanAprJulOct, Some(Promo2Since { week: 0, year: 2010 }))
            .build();
        assert!(limits.check(&bad_week).is_err());
    }
}
