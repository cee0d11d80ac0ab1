//! Selection store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Hold one slot set per (event, participant).
//! - Own the replace protocol: validate, then swap the whole set atomically.
//! - Serve consistent per-event snapshots to the aggregator.
//!
//! # Invariants
//! - `replace` validates every candidate against the event grid before any
//!   write, and writes inside a single `IMMEDIATE` transaction.
//! - Readers never observe a half-applied replace.
//! - An empty selection is stored as no rows; the participant row (nickname,
//!   first-seen order) is kept.
//! - Participant listing order is first-seen order for the event.

use crate::error::{EngineError, EngineResult};
use crate::model::event::{Event, EventId};
use crate::model::participant::{Participant, ParticipantId};
use crate::model::slot::SlotId;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

/// One participant's stored selection, as read in a single snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSelection {
    pub participant: Participant,
    pub slots: Vec<SlotId>,
}

/// Repository interface for participant selections.
pub trait SelectionStore {
    /// Returns the participant's current selection; empty when none exists.
    fn get(&self, event_id: EventId, participant_id: &ParticipantId)
        -> EngineResult<BTreeSet<SlotId>>;

    /// Replaces the participant's whole selection with `candidate`.
    ///
    /// # Errors
    /// - `SlotOutOfRange` when any candidate is outside the event grid; the
    ///   stored selection is left untouched.
    /// - `TransientStoreUnavailable` when the write lock cannot be acquired in
    ///   time; the stored selection is left untouched.
    fn replace(
        &self,
        event: &Event,
        participant: &Participant,
        candidate: &BTreeSet<SlotId>,
    ) -> EngineResult<BTreeSet<SlotId>>;

    /// Participants with a non-empty selection, in first-seen order.
    fn list_participants(&self, event_id: EventId) -> EngineResult<Vec<ParticipantId>>;

    /// Every non-empty selection of the event, read as one snapshot.
    fn load_event_selections(&self, event_id: EventId)
        -> EngineResult<Vec<ParticipantSelection>>;
}

/// SQLite-backed selection store.
#[derive(Debug, Clone, Copy)]
pub struct SqliteSelectionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSelectionStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SelectionStore for SqliteSelectionStore<'_> {
    fn get(
        &self,
        event_id: EventId,
        participant_id: &ParticipantId,
    ) -> EngineResult<BTreeSet<SlotId>> {
        let mut stmt = self.conn.prepare(
            "SELECT slot_date, slot_time
             FROM selections
             WHERE event_uuid = ?1
               AND participant_id = ?2;",
        )?;
        let mut rows = stmt.query(params![event_id.to_string(), participant_id.as_str()])?;
        let mut slots = BTreeSet::new();
        while let Some(row) = rows.next()? {
            slots.insert(parse_slot(row.get(0)?, row.get(1)?)?);
        }
        Ok(slots)
    }

    fn replace(
        &self,
        event: &Event,
        participant: &Participant,
        candidate: &BTreeSet<SlotId>,
    ) -> EngineResult<BTreeSet<SlotId>> {
        event.validate()?;
        if participant.id.is_blank() {
            return Err(EngineError::InvalidParticipant(
                "participant id must not be blank".to_string(),
            ));
        }
        if let Some(slot) = candidate
            .iter()
            .find(|slot| slot.position_in(event).is_none())
        {
            return Err(EngineError::SlotOutOfRange {
                event_id: event.id,
                slot: *slot,
            });
        }

        let event_uuid = event.id.to_string();
        // Dropping the transaction before commit rolls back, so an early return
        // or unwinding caller never leaves a partial replace behind.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO participants (event_uuid, participant_id, nickname)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (event_uuid, participant_id) DO UPDATE
             SET nickname = excluded.nickname,
                 updated_at = (strftime('%s', 'now') * 1000);",
            params![
                event_uuid.as_str(),
                participant.id.as_str(),
                participant.nickname.as_str()
            ],
        )?;

        tx.execute(
            "DELETE FROM selections
             WHERE event_uuid = ?1
               AND participant_id = ?2;",
            params![event_uuid.as_str(), participant.id.as_str()],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO selections (event_uuid, participant_id, slot_date, slot_time)
                 VALUES (?1, ?2, ?3, ?4);",
            )?;
            for slot in candidate {
                insert.execute(params![
                    event_uuid.as_str(),
                    participant.id.as_str(),
                    slot.date_text(),
                    slot.time_text(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(candidate.clone())
    }

    fn list_participants(&self, event_id: EventId) -> EngineResult<Vec<ParticipantId>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.participant_id
             FROM participants p
             WHERE p.event_uuid = ?1
               AND EXISTS (
                   SELECT 1
                   FROM selections s
                   WHERE s.event_uuid = p.event_uuid
                     AND s.participant_id = p.participant_id
               )
             ORDER BY p.seq ASC;",
        )?;
        let mut rows = stmt.query([event_id.to_string()])?;
        let mut participants = Vec::new();
        while let Some(row) = rows.next()? {
            participants.push(ParticipantId::new(row.get::<_, String>(0)?));
        }
        Ok(participants)
    }

    fn load_event_selections(
        &self,
        event_id: EventId,
    ) -> EngineResult<Vec<ParticipantSelection>> {
        // A single statement reads one snapshot; no second query can interleave
        // with a concurrent replace.
        let mut stmt = self.conn.prepare(
            "SELECT p.participant_id, p.nickname, s.slot_date, s.slot_time
             FROM participants p
             INNER JOIN selections s
               ON s.event_uuid = p.event_uuid
              AND s.participant_id = p.participant_id
             WHERE p.event_uuid = ?1
             ORDER BY p.seq ASC, s.slot_date ASC, s.slot_time ASC;",
        )?;
        let mut rows = stmt.query([event_id.to_string()])?;
        let mut selections: Vec<ParticipantSelection> = Vec::new();
        while let Some(row) = rows.next()? {
            let participant_id: String = row.get(0)?;
            let slot = parse_slot(row.get(2)?, row.get(3)?)?;
            if let Some(current) = selections
                .last_mut()
                .filter(|current| current.participant.id.as_str() == participant_id)
            {
                current.slots.push(slot);
                continue;
            }
            selections.push(ParticipantSelection {
                participant: Participant::new(participant_id, row.get::<_, String>(1)?),
                slots: vec![slot],
            });
        }
        Ok(selections)
    }
}

fn parse_slot(date: String, time: String) -> EngineResult<SlotId> {
    SlotId::from_parts(&date, &time).map_err(|err| {
        EngineError::InvalidData(format!("{err} in selections.slot_date/slot_time"))
    })
}
