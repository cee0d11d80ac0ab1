//! Slot identifier model.
//!
//! # Responsibility
//! - Identify one discretized interval of an event grid.
//! - Provide the canonical text forms used by storage and serde.
//!
//! # Invariants
//! - Ordering is `(date, time)`, which matches `(day index, bucket index)`
//!   for any single event.
//! - Text form is `YYYY-MM-DDTHH:MM` at minute granularity.

use crate::model::event::Event;
use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const SLOT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const SLOT_TIME_FORMAT: &str = "%H:%M";
const SLOT_SEPARATOR: char = 'T';

/// One grid cell: a calendar day plus the start time of its bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Failure to parse a slot from its text form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slot id `{0}`; expected YYYY-MM-DDTHH:MM")]
pub struct SlotParseError(pub String);

impl SlotId {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Builds a slot from a date and `hour:minute`; `None` when out of range.
    pub fn at(date: NaiveDate, hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(|time| Self { date, time })
    }

    /// Minute-of-day of the bucket start.
    pub fn minute_of_day(&self) -> u32 {
        self.time.hour() * 60 + self.time.minute()
    }

    /// Returns `(day_index, bucket_index)` of this slot within `event`, or
    /// `None` when the slot is not a member of the event grid.
    pub fn position_in(&self, event: &Event) -> Option<(u32, u32)> {
        if self.date < event.start_day || self.date > event.end_day {
            return None;
        }
        if self.time.second() != 0 || self.time.nanosecond() != 0 {
            return None;
        }
        let minute = self.minute_of_day();
        if minute < event.window_start_minute() || minute >= event.window_end_minute() {
            return None;
        }
        let offset = minute - event.window_start_minute();
        if event.granularity_minutes == 0 || offset % event.granularity_minutes != 0 {
            return None;
        }
        let day_index = (self.date - event.start_day).num_days();
        let day_index = u32::try_from(day_index).ok()?;
        Some((day_index, offset / event.granularity_minutes))
    }

    /// End time of this slot's bucket, as shown in `HH:MM - HH:MM` labels.
    ///
    /// Wraps to `00:00` for a bucket ending at midnight.
    pub fn end_time(&self, event: &Event) -> NaiveTime {
        self.time + Duration::minutes(i64::from(event.granularity_minutes))
    }

    pub fn date_text(&self) -> String {
        self.date.format(SLOT_DATE_FORMAT).to_string()
    }

    pub fn time_text(&self) -> String {
        self.time.format(SLOT_TIME_FORMAT).to_string()
    }

    /// Parses the storage pair (`YYYY-MM-DD`, `HH:MM`).
    pub fn from_parts(date: &str, time: &str) -> Result<Self, SlotParseError> {
        let parsed_date = NaiveDate::parse_from_str(date, SLOT_DATE_FORMAT)
            .map_err(|_| SlotParseError(format!("{date}{SLOT_SEPARATOR}{time}")))?;
        let parsed_time = NaiveTime::parse_from_str(time, SLOT_TIME_FORMAT)
            .map_err(|_| SlotParseError(format!("{date}{SLOT_SEPARATOR}{time}")))?;
        Ok(Self::new(parsed_date, parsed_time))
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{SLOT_SEPARATOR}{}",
            self.date.format(SLOT_DATE_FORMAT),
            self.time.format(SLOT_TIME_FORMAT)
        )
    }
}

impl FromStr for SlotId {
    type Err = SlotParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (date, time) = trimmed
            .split_once(SLOT_SEPARATOR)
            .or_else(|| trimmed.split_once(' '))
            .ok_or_else(|| SlotParseError(value.to_string()))?;
        Self::from_parts(date, time).map_err(|_| SlotParseError(value.to_string()))
    }
}

impl Serialize for SlotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
