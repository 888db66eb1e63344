//! Weekly operating-hours model.
//!
//! A [`WeeklySchedule`] maps each weekday to a [`DaySchedule`]. The serialized
//! form is the `operatingHours` object stored on user records: keyed by
//! lowercase day name, each entry `{ "available", "open", "close" }`, every
//! key optional.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{HandoffError, Result};
use crate::record;

/// Weekdays in Sunday-first order, matching `Weekday::num_days_from_sunday`.
pub const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Which end of a day's window a scan is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Open,
    Close,
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeField::Open => f.write_str("open"),
            TimeField::Close => f.write_str("close"),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One day's availability window.
///
/// `open` and `close` are free-text 12-hour times (`"9:00 AM"`) and may be
/// blank.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaySchedule {
    #[serde(deserialize_with = "null_as_default")]
    pub available: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub open: String,
    #[serde(deserialize_with = "null_as_default")]
    pub close: String,
}

impl DaySchedule {
    /// An available day with the given opening and closing times.
    pub fn hours(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            available: true,
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn closed() -> Self {
        Self::default()
    }

    /// The trimmed time text for `field`, if this day is eligible for it.
    ///
    /// A day is eligible only when it is marked available and the field is
    /// non-blank.
    pub fn time(&self, field: TimeField) -> Option<&str> {
        if !self.available {
            return None;
        }
        let text = match field {
            TimeField::Open => self.open.trim(),
            TimeField::Close => self.close.trim(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Operating hours for a full week.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklySchedule {
    pub sunday: DaySchedule,
    pub monday: DaySchedule,
    pub tuesday: DaySchedule,
    pub wednesday: DaySchedule,
    pub thursday: DaySchedule,
    pub friday: DaySchedule,
    pub saturday: DaySchedule,
}

impl WeeklySchedule {
    pub fn day(&self, weekday: Weekday) -> &DaySchedule {
        match weekday {
            Weekday::Sun => &self.sunday,
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
        }
    }

    pub fn day_mut(&mut self, weekday: Weekday) -> &mut DaySchedule {
        match weekday {
            Weekday::Sun => &mut self.sunday,
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
        }
    }

    pub fn set_day(&mut self, weekday: Weekday, day: DaySchedule) {
        *self.day_mut(weekday) = day;
    }

    /// Builder form of [`set_day`](Self::set_day).
    pub fn with_day(mut self, weekday: Weekday, day: DaySchedule) -> Self {
        self.set_day(weekday, day);
        self
    }

    /// The same hours on every weekday in `days`.
    pub fn uniform(days: &[Weekday], open: &str, close: &str) -> Self {
        days.iter().fold(Self::default(), |schedule, &weekday| {
            schedule.with_day(weekday, DaySchedule::hours(open, close))
        })
    }

    /// Days in Sunday-first order.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        SUNDAY_FIRST
            .into_iter()
            .map(move |weekday| (weekday, self.day(weekday)))
    }

    pub fn is_closed_all_week(&self) -> bool {
        self.iter().all(|(_, day)| !day.available)
    }

    /// Load a schedule from a user record or a bare `operatingHours` object.
    ///
    /// The record is searched for `operatingHours` at the top level, then
    /// under `details`, `donorDetails` and `recipientDetails`. An object with
    /// none of those is read as the schedule itself.
    ///
    /// # Errors
    /// Returns [`HandoffError::InvalidSchedule`] if the input is not a JSON
    /// object or the located schedule has the wrong shape.
    pub fn from_record(record: &Value) -> Result<Self> {
        if !record.is_object() {
            return Err(HandoffError::InvalidSchedule(
                "expected a JSON object".to_string(),
            ));
        }
        let node = record::find_detail(record, "operatingHours").unwrap_or(record);
        if !node.is_object() {
            return Err(HandoffError::InvalidSchedule(
                "operatingHours must be an object".to_string(),
            ));
        }
        Self::deserialize(node).map_err(|e| HandoffError::InvalidSchedule(e.to_string()))
    }

    /// [`from_record`](Self::from_record) over a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_record(&value)
    }
}
