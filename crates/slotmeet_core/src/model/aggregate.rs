//! Derived availability views.
//!
//! # Responsibility
//! - Carry per-slot aggregates from the aggregator to the presentation layer.
//! - Offer sparse (occupied slots only) and dense (full grid) projections.
//!
//! # Invariants
//! - `participant_count == participants.len()`; participants are unique by id.
//! - Slots with no participants are absent from `Heatmap::slots`.
//! - `intensity` is within `[0, 1]`.

use crate::grid;
use crate::model::event::{Event, EventId};
use crate::model::participant::ParticipantId;
use crate::model::slot::SlotId;
use serde::Serialize;
use std::collections::BTreeMap;

/// One participant listed under an aggregated slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotParticipant {
    pub id: ParticipantId,
    pub nickname: String,
}

/// Aggregate of every participant who selected one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSlot {
    pub slot: SlotId,
    pub participant_count: usize,
    /// Store listing order (first-seen participant first).
    pub participants: Vec<SlotParticipant>,
    pub intensity: f64,
}

impl AggregateSlot {
    /// Nicknames in listing order, as rendered in tooltips.
    pub fn participant_nicknames(&self) -> Vec<&str> {
        self.participants
            .iter()
            .map(|participant| participant.nickname.as_str())
            .collect()
    }
}

/// One cell of the dense heatmap, including empty slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub slot: SlotId,
    pub end_time: chrono::NaiveTime,
    pub participant_count: usize,
    pub participant_nicknames: Vec<String>,
    pub intensity: f64,
}

/// Aggregated availability of one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub event: Event,
    pub slots: BTreeMap<SlotId, AggregateSlot>,
}

impl Heatmap {
    pub fn event_id(&self) -> EventId {
        self.event.id
    }

    pub fn get(&self, slot: &SlotId) -> Option<&AggregateSlot> {
        self.slots.get(slot)
    }

    /// Participant count for `slot`; zero for empty or unknown slots.
    pub fn count(&self, slot: &SlotId) -> usize {
        self.slots
            .get(slot)
            .map_or(0, |aggregate| aggregate.participant_count)
    }

    /// Intensity for `slot`; zero for empty or unknown slots.
    pub fn intensity(&self, slot: &SlotId) -> f64 {
        self.slots
            .get(slot)
            .map_or(0.0, |aggregate| aggregate.intensity)
    }

    /// Number of slots with at least one participant.
    pub fn occupied_len(&self) -> usize {
        self.slots.len()
    }

    /// Every valid grid cell in canonical order, empty cells included.
    pub fn dense(&self) -> Vec<HeatmapCell> {
        grid::iter_slots(&self.event)
            .map(|slot| match self.slots.get(&slot) {
                Some(aggregate) => HeatmapCell {
                    slot,
                    end_time: slot.end_time(&self.event),
                    participant_count: aggregate.participant_count,
                    participant_nicknames: aggregate
                        .participants
                        .iter()
                        .map(|participant| participant.nickname.clone())
                        .collect(),
                    intensity: aggregate.intensity,
                },
                None => HeatmapCell {
                    slot,
                    end_time: slot.end_time(&self.event),
                    participant_count: 0,
                    participant_nicknames: Vec::new(),
                    intensity: 0.0,
                },
            })
            .collect()
    }
}
