//! Calendar features derived from the prediction date
//!
//! Every value here is a pure function of the date. Day-of-week numbering
//! is 1 = Monday .. 7 = Sunday, the convention used when the model was
//! trained, so days 6 and 7 are the weekend.

use chrono::{Datelike, NaiveDate};

/// Last day of the month still counted as "start of month"
pub const START_OF_MONTH_LAST_DAY: u32 = 7;

/// First day of the month counted as "end of month"
pub const END_OF_MONTH_FIRST_DAY: u32 = 24;

/// Date-derived features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// 1 = Monday .. 7 = Sunday
    pub day_of_week: u32,
    /// 1-based ordinal day
    pub day_of_year: u32,
    pub quarter: u32,
    pub is_start_of_month: bool,
    pub is_end_of_month: bool,
    pub is_weekend: bool,
}

impl CalendarFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month();
        let day = date.day();
        let day_of_week = date.weekday().number_from_monday();

        Self {
            year: date.year(),
            month,
            day,
            day_of_week,
            day_of_year: date.ordinal(),
            quarter: (month - 1) / 3 + 1,
            is_start_of_month: day <= START_OF_MONTH_LAST_DAY,
            is_end_of_month: day >= END_OF_MONTH_FIRST_DAY,
            is_weekend: day_of_week == 6 || day_of_week == 7,
        }
    }
}

impl From<NaiveDate> for CalendarFeatures {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}
