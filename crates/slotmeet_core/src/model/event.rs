//! Event descriptor model.
//!
//! # Responsibility
//! - Describe the day range, daily window and slot granularity of one event.
//! - Validate the window before any grid or store code relies on it.
//!
//! # Invariants
//! - `start_day <= end_day`.
//! - `min_hour < max_hour <= 24`; windows never cross midnight.
//! - `granularity_minutes` is non-zero and evenly divides the daily window.
//!
//! # See also
//! - crate::grid

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Last valid exclusive hour bound of a daily window.
pub const MAX_HOUR_BOUND: u8 = 24;

/// Stable identifier of an event, issued by the event-metadata collaborator.
pub type EventId = Uuid;

/// Structural problem in an event descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventWindowError {
    #[error("event end day {end} is before start day {start}")]
    DayRangeReversed { start: NaiveDate, end: NaiveDate },
    #[error("daily window {min_hour}:00-{max_hour}:00 is empty or crosses midnight")]
    WindowNotAscending { min_hour: u8, max_hour: u8 },
    #[error("daily window upper bound {max_hour} exceeds 24")]
    HourOutOfRange { max_hour: u8 },
    #[error("slot granularity must be positive")]
    ZeroGranularity,
    #[error("slot granularity {granularity_minutes}m does not divide a {window_minutes}m window")]
    GranularityMismatch {
        granularity_minutes: u32,
        window_minutes: u32,
    },
}

/// Read-only event descriptor consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// First calendar day of the event (inclusive).
    pub start_day: NaiveDate,
    /// Last calendar day of the event (inclusive).
    pub end_day: NaiveDate,
    /// Inclusive lower hour-of-day bound of the daily window.
    pub min_hour: u8,
    /// Exclusive upper hour-of-day bound of the daily window.
    pub max_hour: u8,
    pub granularity_minutes: u32,
}

impl Event {
    /// Builds a descriptor from explicit bounds and validates it.
    pub fn new(
        id: EventId,
        name: impl Into<String>,
        start_day: NaiveDate,
        end_day: NaiveDate,
        min_hour: u8,
        max_hour: u8,
        granularity_minutes: u32,
    ) -> Result<Self, EventWindowError> {
        let event = Self {
            id,
            name: name.into(),
            start_day,
            end_day,
            min_hour,
            max_hour,
            granularity_minutes,
        };
        event.validate()?;
        Ok(event)
    }

    /// Builds a descriptor from the start and end instants picked at event
    /// creation time.
    ///
    /// The day range spans both instants' calendar days and the daily window
    /// runs from the start instant's hour to the end instant's hour. Minutes
    /// are truncated.
    pub fn from_instants(
        id: EventId,
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity_minutes: u32,
    ) -> Result<Self, EventWindowError> {
        // hour() is always < 24, so the narrowing is lossless.
        Self::new(
            id,
            name,
            start.date(),
            end.date(),
            start.hour() as u8,
            end.hour() as u8,
            granularity_minutes,
        )
    }

    /// Checks every structural invariant of the descriptor.
    pub fn validate(&self) -> Result<(), EventWindowError> {
        if self.end_day < self.start_day {
            return Err(EventWindowError::DayRangeReversed {
                start: self.start_day,
                end: self.end_day,
            });
        }
        if self.max_hour > MAX_HOUR_BOUND {
            return Err(EventWindowError::HourOutOfRange {
                max_hour: self.max_hour,
            });
        }
        if self.min_hour >= self.max_hour {
            return Err(EventWindowError::WindowNotAscending {
                min_hour: self.min_hour,
                max_hour: self.max_hour,
            });
        }
        if self.granularity_minutes == 0 {
            return Err(EventWindowError::ZeroGranularity);
        }
        let window_minutes = self.window_minutes();
        if window_minutes % self.granularity_minutes != 0 {
            return Err(EventWindowError::GranularityMismatch {
                granularity_minutes: self.granularity_minutes,
                window_minutes,
            });
        }
        Ok(())
    }

    /// Minute-of-day where the daily window opens.
    pub fn window_start_minute(&self) -> u32 {
        u32::from(self.min_hour) * 60
    }

    /// Minute-of-day where the daily window closes (exclusive).
    pub fn window_end_minute(&self) -> u32 {
        u32::from(self.max_hour) * 60
    }

    /// Length of the daily window in minutes. Zero when the window is invalid.
    pub fn window_minutes(&self) -> u32 {
        self.window_end_minute()
            .saturating_sub(self.window_start_minute())
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, EventWindowError};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn accepts_single_day_single_bucket_window() {
        let event = Event::new(Uuid::new_v4(), "standup", day(1), day(1), 9, 10, 60).unwrap();
        assert_eq!(event.window_minutes(), 60);
    }

    #[test]
    fn display_name_is_not_part_of_the_window() {
        let event = Event::new(Uuid::new_v4(), "  ", day(1), day(2), 8, 10, 30).unwrap();
        assert!(event.validate().is_ok());
        assert!(Event::new(Uuid::new_v4(), "", day(1), day(2), 8, 10, 30).is_ok());
    }

    #[test]
    fn rejects_reversed_day_range() {
        let err = Event::new(Uuid::new_v4(), "trip", day(3), day(1), 8, 10, 30).unwrap_err();
        assert!(matches!(err, EventWindowError::DayRangeReversed { .. }));
    }

    #[test]
    fn rejects_window_crossing_midnight() {
        let err = Event::new(Uuid::new_v4(), "late", day(1), day(2), 22, 2, 30).unwrap_err();
        assert_eq!(
            err,
            EventWindowError::WindowNotAscending {
                min_hour: 22,
                max_hour: 2
            }
        );
    }

    #[test]
    fn rejects_granularity_that_does_not_divide_window() {
        let err = Event::new(Uuid::new_v4(), "odd", day(1), day(1), 8, 9, 25).unwrap_err();
        assert!(matches!(err, EventWindowError::GranularityMismatch { .. }));
        let err = Event::new(Uuid::new_v4(), "zero", day(1), day(1), 8, 9, 0).unwrap_err();
        assert_eq!(err, EventWindowError::ZeroGranularity);
    }

    #[test]
    fn rejects_hour_past_end_of_day() {
        let err = Event::new(Uuid::new_v4(), "x", day(1), day(1), 8, 25, 30).unwrap_err();
        assert_eq!(err, EventWindowError::HourOutOfRange { max_hour: 25 });
    }

    #[test]
    fn from_instants_uses_dates_and_hours() {
        let start = day(10).and_hms_opt(8, 15, 0).unwrap();
        let end = day(12).and_hms_opt(22, 0, 0).unwrap();
        let event = Event::from_instants(Uuid::new_v4(), "offsite", start, end, 30).unwrap();
        assert_eq!(event.start_day, day(10));
        assert_eq!(event.end_day, day(12));
        assert_eq!((event.min_hour, event.max_hour), (8, 22));
    }
}
