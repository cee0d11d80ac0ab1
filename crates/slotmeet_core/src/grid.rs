//! Grid discretization of an event window.
//!
//! # Responsibility
//! - Map an event descriptor to its canonical ordered slot sequence.
//! - Answer slot membership without materializing the sequence.
//!
//! # Invariants
//! - Pure and deterministic; no state, no blocking.
//! - Canonical order is day ascending, then bucket ascending.
//! - `valid_slots(event).len() == day_count(event) * buckets_per_day(event)`.

use crate::error::{EngineError, EngineResult};
use crate::model::event::Event;
use crate::model::slot::SlotId;
use chrono::{Days, NaiveTime};

/// Returns every valid slot of `event` in canonical order.
///
/// # Errors
/// - `InvalidEventWindow` when the descriptor violates its invariants.
pub fn valid_slots(event: &Event) -> EngineResult<Vec<SlotId>> {
    event.validate().map_err(EngineError::InvalidEventWindow)?;
    Ok(iter_slots(event).collect())
}

/// O(1) membership check against the event grid.
///
/// Returns `false` for any slot of a structurally invalid event.
pub fn is_valid(event: &Event, slot: &SlotId) -> bool {
    event.validate().is_ok() && slot.position_in(event).is_some()
}

/// Number of calendar days covered by the event (inclusive range).
pub fn day_count(event: &Event) -> u32 {
    let days = (event.end_day - event.start_day).num_days() + 1;
    u32::try_from(days.max(0)).unwrap_or(0)
}

/// Number of buckets in one day's window.
pub fn buckets_per_day(event: &Event) -> u32 {
    if event.granularity_minutes == 0 {
        return 0;
    }
    event.window_minutes() / event.granularity_minutes
}

/// Total number of grid cells.
pub fn slot_count(event: &Event) -> usize {
    day_count(event) as usize * buckets_per_day(event) as usize
}

/// Slot at `(day_index, bucket_index)`, or `None` when outside the grid.
pub fn slot_at(event: &Event, day_index: u32, bucket_index: u32) -> Option<SlotId> {
    if day_index >= day_count(event) || bucket_index >= buckets_per_day(event) {
        return None;
    }
    let date = event
        .start_day
        .checked_add_days(Days::new(u64::from(day_index)))?;
    let minute = event.window_start_minute() + bucket_index * event.granularity_minutes;
    let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)?;
    Some(SlotId::new(date, time))
}

/// Lazily walks the grid in canonical order.
///
/// Yields nothing for a structurally invalid event.
pub fn iter_slots(event: &Event) -> impl Iterator<Item = SlotId> + '_ {
    let (days, buckets) = if event.validate().is_ok() {
        (day_count(event), buckets_per_day(event))
    } else {
        (0, 0)
    };
    (0..days).flat_map(move |day_index| {
        (0..buckets).filter_map(move |bucket_index| slot_at(event, day_index, bucket_index))
    })
}

#[cfg(test)]
mod tests {
    use super::{buckets_per_day, day_count, is_valid, slot_at, slot_count, valid_slots};
    use crate::error::EngineError;
    use crate::model::event::Event;
    use crate::model::slot::SlotId;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn event(days: u32, min_hour: u8, max_hour: u8, granularity: u32) -> Event {
        Event::new(
            Uuid::new_v4(),
            "grid",
            date(1),
            date(days),
            min_hour,
            max_hour,
            granularity,
        )
        .unwrap()
    }

    #[test]
    fn unnamed_events_still_have_a_grid() {
        let mut unnamed = event(2, 8, 10, 30);
        unnamed.name = String::new();
        assert_eq!(valid_slots(&unnamed).unwrap().len(), 8);
        assert!(is_valid(&unnamed, &SlotId::at(date(1), 8, 0).unwrap()));
    }

    #[test]
    fn two_day_morning_window_has_eight_slots() {
        let event = event(2, 8, 10, 30);
        let slots = valid_slots(&event).unwrap();
        assert_eq!(slots.len(), 8);
        assert_eq!(slots[0], SlotId::at(date(1), 8, 0).unwrap());
        assert_eq!(slots[3], SlotId::at(date(1), 9, 30).unwrap());
        assert_eq!(slots[4], SlotId::at(date(2), 8, 0).unwrap());
        assert_eq!(slots[7], SlotId::at(date(2), 9, 30).unwrap());
    }

    #[test]
    fn grid_is_complete_sorted_and_unique_for_several_shapes() {
        for (days, min_hour, max_hour, granularity) in
            [(1, 0, 24, 60), (3, 8, 22, 30), (7, 9, 12, 15), (1, 23, 24, 5)]
        {
            let event = event(days, min_hour, max_hour, granularity);
            let slots = valid_slots(&event).unwrap();
            assert_eq!(
                slots.len(),
                (day_count(&event) * buckets_per_day(&event)) as usize
            );
            assert_eq!(slots.len(), slot_count(&event));
            assert!(slots.windows(2).all(|pair| pair[0] < pair[1]));
            let unique: HashSet<_> = slots.iter().collect();
            assert_eq!(unique.len(), slots.len());
            assert!(slots.iter().all(|slot| is_valid(&event, slot)));
        }
    }

    #[test]
    fn single_bucket_window_is_legal() {
        let event = event(1, 9, 10, 60);
        assert_eq!(valid_slots(&event).unwrap(), vec![SlotId::at(date(1), 9, 0).unwrap()]);
    }

    #[test]
    fn invalid_descriptor_fails_with_invalid_event_window() {
        let mut event = event(1, 8, 10, 30);
        event.max_hour = 7;
        let err = valid_slots(&event).unwrap_err();
        assert!(matches!(err, EngineError::InvalidEventWindow(_)));
        assert!(!is_valid(&event, &SlotId::at(date(1), 8, 0).unwrap()));
    }

    #[test]
    fn membership_rejects_out_of_grid_slots() {
        let event = event(2, 8, 10, 30);
        assert!(is_valid(&event, &SlotId::at(date(2), 9, 30).unwrap()));
        assert!(!is_valid(&event, &SlotId::at(date(3), 8, 0).unwrap()));
        assert!(!is_valid(&event, &SlotId::at(date(1), 7, 30).unwrap()));
        assert!(!is_valid(&event, &SlotId::at(date(1), 10, 0).unwrap()));
        assert!(!is_valid(&event, &SlotId::at(date(1), 8, 10).unwrap()));
    }

    #[test]
    fn slot_at_maps_indices_and_rejects_overflow() {
        let event = event(2, 8, 10, 30);
        assert_eq!(slot_at(&event, 1, 2), SlotId::at(date(2), 9, 0));
        assert_eq!(slot_at(&event, 2, 0), None);
        assert_eq!(slot_at(&event, 0, 4), None);
    }
}
