//! Event descriptor repository.
//!
//! # Responsibility
//! - Register event descriptors handed over by the event-metadata collaborator.
//! - Load descriptors for grid validation and aggregation.
//!
//! # Invariants
//! - Only descriptors passing `Event::validate()` are persisted.
//! - A registered descriptor is never modified; re-registering the identical
//!   descriptor is a no-op, a different one is rejected.

use crate::error::{EngineError, EngineResult};
use crate::model::event::{Event, EventId};
use crate::model::slot::SLOT_DATE_FORMAT;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    start_day,
    end_day,
    min_hour,
    max_hour,
    granularity_minutes
FROM events";

/// Repository interface for read-only event descriptors.
pub trait EventRepository {
    /// Registers `event`; idempotent for an identical descriptor.
    fn put_event(&self, event: &Event) -> EngineResult<()>;
    /// Loads one descriptor, `None` when unknown.
    fn get_event(&self, id: EventId) -> EngineResult<Option<Event>>;
}

/// SQLite-backed event repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn put_event(&self, event: &Event) -> EngineResult<()> {
        event.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(existing) = load_event(&tx, event.id)? {
            if existing != *event {
                return Err(EngineError::EventConflict(event.id));
            }
            return Ok(());
        }

        tx.execute(
            "INSERT INTO events (
                uuid,
                name,
                start_day,
                end_day,
                min_hour,
                max_hour,
                granularity_minutes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                event.id.to_string(),
                event.name.as_str(),
                event.start_day.format(SLOT_DATE_FORMAT).to_string(),
                event.end_day.format(SLOT_DATE_FORMAT).to_string(),
                event.min_hour,
                event.max_hour,
                event.granularity_minutes,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_event(&self, id: EventId) -> EngineResult<Option<Event>> {
        load_event(self.conn, id)
    }
}

fn load_event(conn: &Connection, id: EventId) -> EngineResult<Option<Event>> {
    let mut stmt = conn.prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;
    let row = stmt
        .query_row([id.to_string()], |row| Ok(parse_event_row(row)))
        .optional()?;
    row.transpose()
}

fn parse_event_row(row: &Row<'_>) -> EngineResult<Event> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        EngineError::InvalidData(format!("invalid uuid value `{uuid_text}` in events.uuid"))
    })?;

    let event = Event {
        id,
        name: row.get("name")?,
        start_day: parse_day(row.get::<_, String>("start_day")?, "start_day")?,
        end_day: parse_day(row.get::<_, String>("end_day")?, "end_day")?,
        min_hour: row.get("min_hour")?,
        max_hour: row.get("max_hour")?,
        granularity_minutes: row.get("granularity_minutes")?,
    };
    event.validate().map_err(|err| {
        EngineError::InvalidData(format!("persisted event {id} is invalid: {err}"))
    })?;
    Ok(event)
}

fn parse_day(value: String, column: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(&value, SLOT_DATE_FORMAT).map_err(|_| {
        EngineError::InvalidData(format!("invalid date `{value}` in events.{column}"))
    })
}
