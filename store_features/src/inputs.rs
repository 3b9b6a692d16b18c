//! Raw prediction inputs
//!
//! [`RawInputs`] is the plain data a caller fills in before asking for a
//! prediction. Categorical fields are closed enumerations whose codes are
//! the labels used when the model was trained (`a`..`d`, `0`, `Jan,Apr,Jul,Oct`, ...).

use crate::{FeatureError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Competition distance meaning "no known competitor"
pub const NO_COMPETITION_DISTANCE: f64 = 100_000.0;

/// Competition distance used when the caller does not supply one
pub const DEFAULT_COMPETITION_DISTANCE: f64 = 5_000.0;

/// Store format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoreType {
    #[default]
    #[serde(rename = "a")]
    A,
    #[serde(rename = "b")]
    B,
    #[serde(rename = "c")]
    C,
    #[serde(rename = "d")]
    D,
}

impl StoreType {
    pub const ALL: [StoreType; 4] = [StoreType::A, StoreType::B, StoreType::C, StoreType::D];

    /// Training-time category code
    pub fn code(&self) -> &'static str {
        match self {
            StoreType::A => "a",
            StoreType::B => "b",
            StoreType::C => "c",
            StoreType::D => "d",
        }
    }
}

/// Assortment level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Assortment {
    /// Basic
    #[default]
    #[serde(rename = "a")]
    A,
    /// Extra
    #[serde(rename = "b")]
    B,
    /// Extended
    #[serde(rename = "c")]
    C,
}

impl Assortment {
    pub const ALL: [Assortment; 3] = [Assortment::A, Assortment::B, Assortment::C];

    /// Training-time category code
    pub fn code(&self) -> &'static str {
        match self {
            Assortment::A => "a",
            Assortment::B => "b",
            Assortment::C => "c",
        }
    }
}

/// State holiday on the prediction date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StateHoliday {
    #[default]
    #[serde(rename = "0")]
    None,
    #[serde(rename = "a")]
    PublicHoliday,
    #[serde(rename = "b")]
    Easter,
    #[serde(rename = "c")]
    Christmas,
}

impl StateHoliday {
    pub const ALL: [StateHoliday; 4] = [
        StateHoliday::None,
        StateHoliday::PublicHoliday,
        StateHoliday::Easter,
        StateHoliday::Christmas,
    ];

    /// Training-time category code
    pub fn code(&self) -> &'static str {
        match self {
            StateHoliday::None => "0",
            StateHoliday::PublicHoliday => "a",
            StateHoliday::Easter => "b",
            StateHoliday::Christmas => "c",
        }
    }
}

/// Months in which a continuing (Promo2) promotion restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PromoInterval {
    #[default]
    #[serde(rename = "None")]
    None,
    #[serde(rename = "Jan,Apr,Jul,Oct")]
    JanAprJulOct,
    #[serde(rename = "Feb,May,Aug,Nov")]
    FebMayAugNov,
    #[serde(rename = "Mar,Jun,Sept,Dec")]
    MarJunSeptDec,
}

impl PromoInterval {
    pub const ALL: [PromoInterval; 4] = [
        PromoInterval::None,
        PromoInterval::JanAprJulOct,
        PromoInterval::FebMayAugNov,
        PromoInterval::MarJunSeptDec,
    ];

    /// Suffix of the one-hot slot, e.g. `Jan_Apr_Jul_Oct`
    pub fn code(&self) -> &'static str {
        match self {
            PromoInterval::None => "None",
            PromoInterval::JanAprJulOct => "Jan_Apr_Jul_Oct",
            PromoInterval::FebMayAugNov => "Feb_May_Aug_Nov",
            PromoInterval::MarJunSeptDec => "Mar_Jun_Sept_Dec",
        }
    }

    /// Calendar months (1-12) covered by the interval
    pub fn months(&self) -> &'static [u32] {
        match self {
            PromoInterval::None => &[],
            PromoInterval::JanAprJulOct => &[1, 4, 7, 10],
            PromoInterval::FebMayAugNov => &[2, 5, 8, 11],
            PromoInterval::MarJunSeptDec => &[3, 6, 9, 12],
        }
    }

    /// Whether the interval restarts the promotion in `month`
    pub fn contains_month(&self, month: u32) -> bool {
        self.months().contains(&month)
    }
}

/// Year and month a competitor opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a validated year/month pair
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(FeatureError::invalid_input(
                "competition_open_since",
                format!("month must be between 1 and 12, got {}", month),
            ));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(FeatureError::invalid_input(
                "competition_open_since",
                format!("year {} is out of range", year),
            ));
        }

        Ok(Self { year, month })
    }

    /// Form values where month 0 means "not known"
    pub fn from_form(year: i32, month: u32) -> Result<Option<Self>> {
        if month == 0 {
            return Ok(None);
        }
        Self::new(year, month).map(Some)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        // validated in `new`
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl FromStr for YearMonth {
    type Err = FeatureError;

    /// Parse `YYYY-MM`
    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s.trim().split_once('-').ok_or_else(|| {
            FeatureError::invalid_input("competition_open_since", format!("expected YYYY-MM, got '{}'", s))
        })?;
        let year = year.parse::<i32>().map_err(|e| {
            FeatureError::invalid_input("competition_open_since", format!("bad year '{}': {}", year, e))
        })?;
        let month = month.parse::<u32>().map_err(|e| {
            FeatureError::invalid_input("competition_open_since", format!("bad month '{}': {}", month, e))
        })?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = FeatureError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Calendar week and year a store joined the continuing promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Promo2Since {
    pub week: u32,
    pub year: i32,
}

impl Promo2Since {
    /// Form values where week 0 and year 0 mean "not known"
    pub fn from_form(week: u32, year: i32) -> Option<Self> {
        if week == 0 && year == 0 {
            None
        } else {
            Some(Self { week, year })
        }
    }
}

impl FromStr for Promo2Since {
    type Err = FeatureError;

    /// Parse `WEEK/YEAR`
    fn from_str(s: &str) -> Result<Self> {
        let (week, year) = s.trim().split_once('/').ok_or_else(|| {
            FeatureError::invalid_input("promo2_since", format!("expected WEEK/YEAR, got '{}'", s))
        })?;
        let week = week.parse::<u32>().map_err(|e| {
            FeatureError::invalid_input("promo2_since", format!("bad week '{}': {}", week, e))
        })?;
        let year = year.parse::<i32>().map_err(|e| {
            FeatureError::invalid_input("promo2_since", format!("bad year '{}': {}", year, e))
        })?;
        Ok(Self { week, year })
    }
}

/// Everything a caller supplies for one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    pub date: NaiveDate,
    pub store_id: u32,
    /// Meters to the nearest competitor; [`NO_COMPETITION_DISTANCE`] when none is known
    pub competition_distance: f64,
    pub competition_open_since: Option<YearMonth>,
    pub promo: bool,
    pub promo2: bool,
    pub promo2_since: Option<Promo2Since>,
    /// Only consulted when `promo2` is set
    pub promo_interval: PromoInterval,
    pub store_type: StoreType,
    pub assortment: Assortment,
    pub state_holiday: StateHoliday,
    pub school_holiday: bool,
}

impl RawInputs {
    /// Start from the dashboard defaults for a store and date
    pub fn builder(date: NaiveDate, store_id: u32) -> RawInputsBuilder {
        RawInputsBuilder::new(date, store_id)
    }

    /// Day of the month of the prediction date
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Builder for [`RawInputs`]
#[derive(Debug, Clone)]
pub struct RawInputsBuilder {
    inputs: RawInputs,
}

impl RawInputsBuilder {
    pub fn new(date: NaiveDate, store_id: u32) -> Self {
        Self {
            inputs: RawInputs {
                date,
                store_id,
                competition_distance: DEFAULT_COMPETITION_DISTANCE,
                competition_open_since: None,
                promo: false,
                promo2: false,
                promo2_since: None,
                promo_interval: PromoInterval::None,
                store_type: StoreType::A,
                assortment: Assortment::A,
                state_holiday: StateHoliday::None,
                school_holiday: false,
            },
        }
    }

    pub fn competition_distance(mut self, meters: f64) -> Self {
        self.inputs.competition_distance = meters;
        self
    }

    pub fn competition_open_since(mut self, since: Option<YearMonth>) -> Self {
        self.inputs.competition_open_since = since;
        self
    }

    pub fn promo(mut self, active: bool) -> Self {
        self.inputs.promo = active;
        self
    }

    /// Enable the continuing promotion with its restart interval
    pub fn promo2(mut self, interval: PromoInterval, since: Option<Promo2Since>) -> Self {
        self.inputs.promo2 = true;
        self.inputs.promo_interval = interval;
        self.inputs.promo2_since = since;
        self
    }

    pub fn store_type(mut self, store_type: StoreType) -> Self {
        self.inputs.store_type = store_type;
        self
    }

    pub fn assortment(mut self, assortment: Assortment) -> Self {
        self.inputs.assortment = assortment;
        self
    }

    pub fn state_holiday(mut self, holiday: StateHoliday) -> Self {
        self.inputs.state_holiday = holiday;
        self
    }

    pub fn school_holiday(mut self, holiday: bool) -> Self {
        self.inputs.school_holiday = holiday;
        self
    }

    pub fn build(self) -> RawInputs {
        self.inputs
    }
}

macro_rules! impl_category_codes {
    ($ty:ident, $field:literal) => {
        impl FromStr for $ty {
            type Err = FeatureError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                $ty::ALL
                    .into_iter()
                    .find(|value| value.code().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let known: Vec<&str> = $ty::ALL.iter().map(|v| v.code()).collect();
                        FeatureError::invalid_input(
                            $field,
                            format!("unknown code '{}', expected one of {}", s, known.join(", ")),
                        )
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

impl_category_codes!(StoreType, "store_type");
impl_category_codes!(Assortment, "assortment");
impl_category_codes!(StateHoliday, "state_holiday");

impl FromStr for PromoInterval {
    type Err = FeatureError;

    /// Accepts the training labels (`Jan,Apr,Jul,Oct`), slot suffixes
    /// (`Jan_Apr_Jul_Oct`) and `Sep` for `Sept`
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace(['_', ' '], ",").to_ascii_lowercase();
        match normalized.as_str() {
            "" | "none" | "0" => Ok(PromoInterval::None),
            "jan,apr,jul,oct" => Ok(PromoInterval::JanAprJulOct),
            "feb,may,aug,nov" => Ok(PromoInterval::FebMayAugNov),
            "mar,jun,sept,dec" | "mar,jun,sep,dec" => Ok(PromoInterval::MarJunSeptDec),
            _ => Err(FeatureError::invalid_input(
                "promo_interval",
                format!(
                    "unknown interval '{}', expected None, Jan,Apr,Jul,Oct, Feb,May,Aug,Nov or Mar,Jun,Sept,Dec",
                    s
                ),
            )),
        }
    }
}

impl fmt::Display for PromoInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PromoInterval::None => "None",
            PromoInterval::JanAprJulOct => "Jan,Apr,Jul,Oct",
            PromoInterval::FebMayAugNov => "Feb,May,Aug,Nov",
            PromoInterval::MarJunSeptDec => "Mar,Jun,Sept,Dec",
        })
    }
}
