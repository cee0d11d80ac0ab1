//! Confirmation use-case: the single mutation entry point.
//!
//! # Responsibility
//! - Normalize a raw candidate into a deduplicated slot set.
//! - Delegate the atomic replace to the selection store.
//! - Return the freshly aggregated heatmap of the event.
//!
//! # Invariants
//! - Either the whole candidate becomes the participant's selection and the
//!   returned heatmap reflects it, or nothing changes.
//! - The coordinator never retries; `TransientStoreUnavailable` is returned to
//!   the caller, who may retry the same candidate safely.

use crate::config::IntensityConfig;
use crate::error::EngineResult;
use crate::grid;
use crate::model::aggregate::Heatmap;
use crate::model::event::{Event, EventId};
use crate::model::participant::{Participant, ParticipantId};
use crate::model::slot::SlotId;
use crate::repo::event_repo::EventRepository;
use crate::repo::selection_repo::SelectionStore;
use crate::service::aggregate_service::AggregateService;
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::time::Instant;

/// Coordinator for confirm/get/aggregate calls from the presentation layer.
pub struct ConfirmService<E: EventRepository, S: SelectionStore> {
    aggregator: AggregateService<E, S>,
}

impl<E: EventRepository, S: SelectionStore> ConfirmService<E, S> {
    pub fn new(events: E, store: S, intensity: IntensityConfig) -> EngineResult<Self> {
        Ok(Self {
            aggregator: AggregateService::new(events, store, intensity)?,
        })
    }

    pub fn aggregator(&self) -> &AggregateService<E, S> {
        &self.aggregator
    }

    /// Registers an event descriptor handed over by the metadata collaborator.
    pub fn register_event(&self, event: &Event) -> EngineResult<()> {
        self.aggregator.events().put_event(event)?;
        info!(
            "event=register_event module=service status=ok event_id={} slot_count={}",
            event.id,
            grid::slot_count(event)
        );
        Ok(())
    }

    /// Replaces the participant's selection with `raw_candidate` and returns
    /// the updated heatmap.
    ///
    /// Duplicates in `raw_candidate` are collapsed before validation.
    ///
    /// # Errors
    /// - `NotFound` for an unknown event.
    /// - `SlotOutOfRange` when any slot is outside the grid; nothing changed.
    /// - `TransientStoreUnavailable` when the store is busy; retrying with the
    ///   same candidate is safe because replace is idempotent.
    pub fn confirm<I>(
        &self,
        event_id: EventId,
        participant: &Participant,
        raw_candidate: I,
    ) -> EngineResult<Heatmap>
    where
        I: IntoIterator<Item = SlotId>,
    {
        let started_at = Instant::now();
        let candidate: BTreeSet<SlotId> = raw_candidate.into_iter().collect();

        let result = self
            .aggregator
            .require_event(event_id)
            .and_then(|event| {
                self.aggregator
                    .store()
                    .replace(&event, participant, &candidate)
                    .map(|_| event)
            })
            .and_then(|event| self.aggregator.aggregate_event(event));

        match &result {
            Ok(heatmap) => info!(
                "event=confirm module=service status=ok event_id={} slot_count={} occupied_slots={} duration_ms={}",
                event_id,
                candidate.len(),
                heatmap.slots.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) if err.is_retryable() => error!(
                "event=confirm module=service status=error event_id={} error_code={} retryable=true duration_ms={} error={}",
                event_id,
                err.code(),
                started_at.elapsed().as_millis(),
                err
            ),
            Err(err) => warn!(
                "event=confirm module=service status=rejected event_id={} error_code={} duration_ms={}",
                event_id,
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }

        result
    }

    /// Returns the participant's own stored selection, for restoring an
    /// in-progress grid.
    pub fn selection(
        &self,
        event_id: EventId,
        participant_id: &ParticipantId,
    ) -> EngineResult<BTreeSet<SlotId>> {
        self.aggregator.require_event(event_id)?;
        self.aggregator.store().get(event_id, participant_id)
    }

    /// Aggregates the event's current selections.
    pub fn aggregate(&self, event_id: EventId) -> EngineResult<Heatmap> {
        self.aggregator.aggregate(event_id)
    }

    /// Participants with a non-empty selection, in first-seen order.
    pub fn participants(&self, event_id: EventId) -> EngineResult<Vec<ParticipantId>> {
        self.aggregator.require_event(event_id)?;
        self.aggregator.store().list_participants(event_id)
    }
}
