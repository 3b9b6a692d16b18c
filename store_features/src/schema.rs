//! Feature schema: the ordered slot list the trained model expects
//!
//! The order of the slots is part of the model contract. The built-in
//! [`FeatureSchema::rossmann`] layout is the one the sales model was fit on.

use crate::{FeatureError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Slot names of the Rossmann sales model, in training order
const ROSSMANN_FEATURES: [&str; 53] = [
    "Store",
    "CompetitionDistance",
    "CompetitionOpenSinceMonth",
    "CompetitionOpenSinceYear",
    "Promo",
    "Promo2",
    "Promo2SinceWeek",
    "Promo2SinceYear",
    "IsWeekend",
    "IsStartOfMonth",
    "IsEndOfMonth",
    "DayOfYear",
    "Quarter",
    "HasCompetition",
    "DateCompetition",
    "IsPromo2ActiveMonth",
    "StoreType_a",
    "StoreType_b",
    "StoreType_c",
    "StoreType_d",
    "Assortment_a",
    "Assortment_b",
    "Assortment_c",
    "StateHoliday_0",
    "StateHoliday_a",
    "StateHoliday_b",
    "StateHoliday_c",
    "SchoolHoliday_0",
    "SchoolHoliday_1",
    "DayOfWeek_1",
    "DayOfWeek_2",
    "DayOfWeek_3",
    "DayOfWeek_4",
    "DayOfWeek_5",
    "DayOfWeek_6",
    "DayOfWeek_7",
    "Month_1",
    "Month_2",
    "Month_3",
    "Month_4",
    "Month_5",
    "Month_6",
    "Month_7",
    "Month_8",
    "Month_9",
    "Month_10",
    "Month_11",
    "Month_12",
    "PromoInterval_None",
    "PromoInterval_Jan_Apr_Jul_Oct",
    "PromoInterval_Feb_May_Aug_Nov",
    "PromoInterval_Mar_Jun_Sept_Dec",
    "Year",
];

/// Slots holding 0/1 flags that are not part of a one-hot family
const FLAG_FEATURES: [&str; 7] = [
    "Promo",
    "Promo2",
    "IsWeekend",
    "IsStartOfMonth",
    "IsEndOfMonth",
    "HasCompetition",
    "IsPromo2ActiveMonth",
];

/// Categorical families expanded into one-hot indicator slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureFamily {
    StoreType,
    Assortment,
    StateHoliday,
    SchoolHoliday,
    DayOfWeek,
    Month,
    PromoInterval,
}

impl FeatureFamily {
    /// All families, in the order they appear in the Rossmann schema
    pub const ALL: [FeatureFamily; 7] = [
        FeatureFamily::StoreType,
        FeatureFamily::Assortment,
        FeatureFamily::StateHoliday,
        FeatureFamily::SchoolHoliday,
        FeatureFamily::DayOfWeek,
        FeatureFamily::Month,
        FeatureFamily::PromoInterval,
    ];

    /// Slot name prefix shared by every indicator of the family
    pub fn prefix(&self) -> &'static str {
        match self {
            FeatureFamily::StoreType => "StoreType_",
            FeatureFamily::Assortment => "Assortment_",
            FeatureFamily::StateHoliday => "StateHoliday_",
            FeatureFamily::SchoolHoliday => "SchoolHoliday_",
            FeatureFamily::DayOfWeek => "DayOfWeek_",
            FeatureFamily::Month => "Month_",
            FeatureFamily::PromoInterval => "PromoInterval_",
        }
    }

    /// Indicator slot name for a category label, e.g. `Month_8`
    pub fn slot_name(&self, label: &str) -> String {
        format!("{}{}", self.prefix(), label)
    }

    fn classify(name: &str) -> Option<FeatureFamily> {
        FeatureFamily::ALL
            .into_iter()
            .find(|family| name.starts_with(family.prefix()) && name.len() > family.prefix().len())
    }
}

impl fmt::Display for FeatureFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches('_'))
    }
}

/// Semantic type of a feature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Raw magnitude (distances, years, day counts)
    Numeric,
    /// Standalone 0/1 flag
    Flag,
    /// One indicator of a one-hot categorical family
    OneHot(FeatureFamily),
}

/// A named slot of the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSlot {
    name: String,
    kind: FeatureKind,
}

impl FeatureSlot {
    fn classify(name: String) -> Self {
        let kind = if let Some(family) = FeatureFamily::classify(&name) {
            FeatureKind::OneHot(family)
        } else if FLAG_FEATURES.contains(&name.as_str()) {
            FeatureKind::Flag
        } else {
            FeatureKind::Numeric
        };

        Self { name, kind }
    }

    /// Slot name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot semantic type
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }
}

/// Ordered, immutable list of feature slots
///
/// Serialized as the plain list of slot names; deserializing goes through
/// [`FeatureSchema::from_names`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    slots: Vec<FeatureSlot>,
}

impl FeatureSchema {
    /// The 53-slot layout the Rossmann sales model was trained on
    pub fn rossmann() -> Self {
        Self {
            slots: ROSSMANN_FEATURES
                .iter()
                .map(|name| FeatureSlot::classify((*name).to_string()))
                .collect(),
        }
    }

    /// Build a schema from an explicit slot-name list, classifying each slot by name
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut slots = Vec::new();

        for name in names {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(FeatureError::InvalidSchema(format!(
                    "empty slot name at position {}",
                    slots.len()
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(FeatureError::InvalidSchema(format!(
                    "duplicate slot name '{}'",
                    name
                )));
            }
            slots.push(FeatureSlot::classify(name));
        }

        if slots.is_empty() {
            return Err(FeatureError::InvalidSchema(
                "schema has no slots".to_string(),
            ));
        }

        Ok(Self { slots })
    }

    /// Slots in model order
    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    /// Slot names in model order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(|slot| slot.name())
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the schema has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Position of a slot in model order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name() == name)
    }

    /// Whether the schema has a slot with this name
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Indicator slots belonging to a one-hot family, in model order
    pub fn family_slots(&self, family: FeatureFamily) -> Vec<&FeatureSlot> {
        self.slots
            .iter()
            .filter(|slot| slot.kind() == FeatureKind::OneHot(family))
            .collect()
    }

    /// Verify that an externally recorded name list (e.g. the one stored in a
    /// model artifact) matches this schema slot for slot
    pub fn check_names<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for (position, slot) in self.slots.iter().enumerate() {
            match names.get(position) {
                Some(name) if name.as_ref() == slot.name() => {}
                Some(name) => {
                    return Err(FeatureError::SchemaMismatch {
                        slot: format!(
                            "{} (position {} holds '{}')",
                            slot.name(),
                            position,
                            name.as_ref()
                        ),
                    })
                }
                None => {
                    return Err(FeatureError::SchemaMismatch {
                        slot: slot.name().to_string(),
                    })
                }
            }
        }

        if let Some(extra) = names.get(self.slots.len()) {
            return Err(FeatureError::SchemaMismatch {
                slot: format!("{} (not part of the schema)", extra.as_ref()),
            });
        }

        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::rossmann()
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = FeatureError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::from_names(names)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.slots.into_iter().map(|slot| slot.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rossmann_layout() {
        let schema = FeatureSchema::rossmann();
        assert_eq!(schema.len(), 53);
        assert_eq!(schema.slots()[0].name(), "Store");
        assert_eq!(schema.slots()[52].name(), "Year");
        assert_eq!(schema.position("DateCompetition"), Some(14));
    }

    #[test]
    fn test_slot_classification() {
        let schema = FeatureSchema::rossmann();
        let kind = |name: &str| schema.slots()[schema.position(name).unwrap()].kind();

        assert_eq!(kind("Store"), FeatureKind::Numeric);
        assert_eq!(kind("Promo2SinceWeek"), FeatureKind::Numeric);
        assert_eq!(kind("Promo"), FeatureKind::Flag);
        assert_eq!(kind("IsWeekend"), FeatureKind::Flag);
        assert_eq!(
            kind("PromoInterval_None"),
            FeatureKind::OneHot(FeatureFamily::PromoInterval)
        );
        assert_eq!(
            kind("StateHoliday_0"),
            FeatureKind::OneHot(FeatureFamily::StateHoliday)
        );
        assert_eq!(
            kind("SchoolHoliday_1"),
            FeatureKind::OneHot(FeatureFamily::SchoolHoliday)
        );
    }

    #[test]
    fn test_family_sizes() {
        let schema = FeatureSchema::rossmann();
        let sizes: Vec<usize> = FeatureFamily::ALL
            .iter()
            .map(|family| schema.family_slots(*family).len())
            .collect();
        assert_eq!(sizes, vec![4, 3, 4, 2, 7, 12, 4]);
    }

    #[test]
    fn test_from_names_rejects_duplicates() {
        assert!(FeatureSchema::from_names(["Store", "Promo", "Store"]).is_err());
        assert!(FeatureSchema::from_names(Vec::<String>::new()).is_err());
        assert!(FeatureSchema::from_names(["Store", " "]).is_err());
    }

    #[test]
    fn test_check_names() {
        let schema = FeatureSchema::from_names(["Store", "Promo", "Year"]).unwrap();
        assert!(schema.check_names(&["Store", "Promo", "Year"]).is_ok());

        let swapped = schema.check_names(&["Store", "Year", "Promo"]).unwrap_err();
        assert!(swapped.to_string().contains("Promo"));

        assert!(schema.check_names(&["Store", "Promo"]).is_err());
        assert!(schema.check_names(&["Store", "Promo", "Year", "Extra"]).is_err());
    }

    #[test]
    fn test_deserialize_validates_names() {
        let schema: FeatureSchema =
            serde_json::from_str(r#"["Store", "Promo", "Month_8"]"#).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(
            schema.slots()[2].kind(),
            FeatureKind::OneHot(FeatureFamily::Month)
        );

        assert!(serde_json::from_str::<FeatureSchema>(r#"["Store", "Store"]"#).is_err());
        assert!(serde_json::from_str::<FeatureSchema>(r#"["Store", ""]"#).is_err());
        assert!(serde_json::from_str::<FeatureSchema>("[]").is_err());
    }

    #[test]
    fn test_serializes_as_names() {
        let schema = FeatureSchema::rossmann();
        let text = serde_json::to_string(&schema).unwrap();
        assert!(text.starts_with(r#"["Store","CompetitionDistance""#));
        let back: FeatureSchema = serde_json::from_str(&text).unwrap();
        assert_eq!(back, schema);
    }
}
