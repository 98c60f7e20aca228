//! Daily entry data models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::errors::{EntryError, EntryResult};

/// The habit inputs recorded for one calendar date.
///
/// Serialized in camelCase, e.g.
/// `{"date":"2025-04-22","trashCount":1,"recycleCount":2,"milesDriven":3.5,"reusableBottle":true,"reusableBag":false}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyInputs {
    pub date: NaiveDate,
    #[serde(default)]
    pub trash_count: u32,
    #[serde(default)]
    pub recycle_count: u32,
    #[serde(default)]
    pub miles_driven: f64,
    #[serde(default)]
    pub reusable_bottle: bool,
    #[serde(default)]
    pub reusable_bag: bool,
}

impl DailyInputs {
    /// Inputs for `date` with every count at zero and every flag off
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            trash_count: 0,
            recycle_count: 0,
            miles_driven: 0.0,
            reusable_bottle: false,
            reusable_bag: false,
        }
    }

    /// Check the inputs can be stored as-is
    ///
    /// # Errors
    ///
    /// * `EntryError::InvalidMiles` - Mileage is negative, NaN or infinite
    pub fn validate(&self) -> EntryResult<()> {
        if !self.miles_driven.is_finite() || self.miles_driven < 0.0 {
            return Err(EntryError::InvalidMiles(self.miles_driven));
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` calendar date
///
/// # Errors
///
/// * `EntryError::InvalidDate` - Text is not a valid ISO calendar date
pub fn parse_date(text: &str) -> EntryResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| EntryError::InvalidDate(text.to_string()))
}

/// A saved entry as confirmed by the backend.
///
/// `raw` is `None` when nothing has been saved for the date yet, in which case
/// `points_total` is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntryView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub points_total: u32,
    #[serde(default)]
    pub raw: Option<DailyInputs>,
}

impl DailyEntryView {
    /// View for a date that has no saved entry
    pub fn unsaved(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            points_total: 0,
            raw: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_wire_format_is_camel_case() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 22).unwrap();
        let inputs = DailyInputs {
            trash_count: 1,
            recycle_count: 2,
            miles_driven: 3.5,
            reusable_bottle: true,
            ..DailyInputs::empty(date)
        };

        let json = serde_json::to_value(&inputs).unwrap();
        assert_eq!(json["date"], "2025-04-22");
        assert_eq!(json["trashCount"], 1);
        assert_eq!(json["recycleCount"], 2);
        assert_eq!(json["milesDriven"], 3.5);
        assert_eq!(json["reusableBottle"], true);
        assert_eq!(json["reusableBag"], false);
    }

    #[test]
    fn test_view_accepts_null_raw_and_missing_date() {
        let view: DailyEntryView =
            serde_json::from_str(r#"{"raw":null,"pointsTotal":0}"#).unwrap();
        assert!(view.raw.is_none());
        assert!(view.date.is_none());
        assert_eq!(view.points_total, 0);
    }

    #[test]
    fn test_integer_miles_deserialize() {
        let inputs: DailyInputs = serde_json::from_str(
            r#"{"date":"2025-01-02","trashCount":0,"recycleCount":0,"milesDriven":12,"reusableBottle":false,"reusableBag":false}"#,
        )
        .unwrap();
        assert_eq!(inputs.miles_driven, 12.0);
    }

    #[test]
    fn test_validate_rejects_bad_miles() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let mut inputs = DailyInputs::empty(date);
        assert!(inputs.validate().is_ok());

        inputs.miles_driven = -1.0;
        assert!(matches!(inputs.validate(), Err(EntryError::InvalidMiles(_))));

        inputs.miles_driven = f64::NAN;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-02-28").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert!(matches!(parse_date("2025-02-30"), Err(EntryError::InvalidDate(_))));
        assert!(parse_date("today").is_err());
    }
}
