//! Availability aggregation use-case.
//!
//! # Responsibility
//! - Derive per-slot participant sets, counts and intensities for one event.
//!
//! # Invariants
//! - Read-only: never mutates the store.
//! - Cache-free: two calls agree unless the store changed in between.
//! - A participant counts at most once per slot.

use crate::config::IntensityConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::aggregate::{AggregateSlot, Heatmap, SlotParticipant};
use crate::model::event::{Event, EventId};
use crate::model::slot::SlotId;
use crate::repo::event_repo::EventRepository;
use crate::repo::selection_repo::{ParticipantSelection, SelectionStore};
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

/// Aggregator over an event repository and a selection store.
pub struct AggregateService<E: EventRepository, S: SelectionStore> {
    events: E,
    store: S,
    intensity: IntensityConfig,
}

impl<E: EventRepository, S: SelectionStore> AggregateService<E, S> {
    /// Fails with `InvalidConfig` when `intensity` could yield values outside
    /// `[0, 1]` or decrease as the participant count grows.
    pub fn new(events: E, store: S, intensity: IntensityConfig) -> EngineResult<Self> {
        intensity.validate()?;
        Ok(Self {
            events,
            store,
            intensity,
        })
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn intensity_config(&self) -> IntensityConfig {
        self.intensity
    }

    /// Loads the event or fails with `NotFound`.
    pub fn require_event(&self, event_id: EventId) -> EngineResult<Event> {
        self.events
            .get_event(event_id)?
            .ok_or(EngineError::NotFound(event_id))
    }

    /// Aggregates every stored selection of `event_id`.
    ///
    /// # Errors
    /// - `NotFound` for an unknown event.
    /// - `TransientStoreUnavailable` when the snapshot read times out.
    pub fn aggregate(&self, event_id: EventId) -> EngineResult<Heatmap> {
        let event = self.require_event(event_id)?;
        self.aggregate_event(event)
    }

    /// Aggregates the stored selections of an already loaded event.
    pub fn aggregate_event(&self, event: Event) -> EngineResult<Heatmap> {
        let started_at = Instant::now();
        let selections = self.store.load_event_selections(event.id)?;
        let heatmap = build_heatmap(event, &selections, self.intensity);
        debug!(
            "event=aggregate module=service status=ok event_id={} participants={} occupied_slots={} duration_ms={}",
            heatmap.event.id,
            selections.len(),
            heatmap.slots.len(),
            started_at.elapsed().as_millis()
        );
        Ok(heatmap)
    }
}

/// Folds participant selections into a heatmap.
///
/// Slots outside the event grid are skipped; they can only come from rows
/// written outside the store's replace protocol.
pub fn build_heatmap(
    event: Event,
    selections: &[ParticipantSelection],
    intensity: IntensityConfig,
) -> Heatmap {
    let mut members: BTreeMap<SlotId, (Vec<SlotParticipant>, HashSet<&str>)> = BTreeMap::new();
    let mut skipped = 0usize;

    for selection in selections {
        let participant = &selection.participant;
        for slot in &selection.slots {
            if slot.position_in(&event).is_none() {
                skipped += 1;
                continue;
            }
            let (listed, seen) = members.entry(*slot).or_default();
            if seen.insert(participant.id.as_str()) {
                listed.push(SlotParticipant {
                    id: participant.id.clone(),
                    nickname: participant.nickname.clone(),
                });
            }
        }
    }

    if skipped > 0 {
        warn!(
            "event=aggregate module=service status=degraded event_id={} skipped_slots={}",
            event.id, skipped
        );
    }

    let slots = members
        .into_iter()
        .map(|(slot, (participants, _))| {
            let participant_count = participants.len();
            (
                slot,
                AggregateSlot {
                    slot,
                    participant_count,
                    participants,
                    intensity: intensity.intensity(participant_count),
                },
            )
        })
        .collect();

    Heatmap { event, slots }
}
