//! Engine error taxonomy.
//!
//! # Responsibility
//! - Name every failure a caller of the engine can observe.
//! - Classify storage failures into retryable and fatal ones.
//!
//! # Invariants
//! - Only `TransientStoreUnavailable` is retryable.
//! - Validation errors are raised before any mutation.

use crate::config::ConfigError;
use crate::db::DbError;
use crate::model::event::{EventId, EventWindowError};
use crate::model::slot::SlotId;
use rusqlite::ErrorCode;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure surfaced by grid, store, aggregator or coordinator operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Event descriptor is structurally invalid; fix the event, do not retry.
    #[error("invalid event window: {0}")]
    InvalidEventWindow(#[from] EventWindowError),
    /// Candidate references a slot outside the event grid; nothing was changed.
    #[error("slot {slot} is outside the grid of event {event_id}")]
    SlotOutOfRange { event_id: EventId, slot: SlotId },
    /// Lock acquisition or persistence failed transiently; safe to retry.
    #[error("selection store temporarily unavailable: {0}")]
    TransientStoreUnavailable(#[source] rusqlite::Error),
    /// Unknown event id.
    #[error("event not found: {0}")]
    NotFound(EventId),
    /// Event id is already registered with a different descriptor.
    #[error("event {0} is already registered with a different descriptor")]
    EventConflict(EventId),
    /// Participant id is blank.
    #[error("invalid participant: {0}")]
    InvalidParticipant(String),
    /// Intensity or store settings are unusable; fix the configuration.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    /// Non-transient storage failure.
    #[error("{0}")]
    Db(#[source] DbError),
    /// Persisted rows cannot be converted into valid domain values.
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl EngineError {
    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStoreUnavailable(_))
    }

    /// Stable short code for structured log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEventWindow(_) => "invalid_event_window",
            Self::SlotOutOfRange { .. } => "slot_out_of_range",
            Self::TransientStoreUnavailable(_) => "transient_store_unavailable",
            Self::NotFound(_) => "not_found",
            Self::EventConflict(_) => "event_conflict",
            Self::InvalidParticipant(_) => "invalid_participant",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Db(_) => "db_error",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(value: rusqlite::Error) -> Self {
        if is_transient(&value) {
            Self::TransientStoreUnavailable(value)
        } else {
            Self::Db(DbError::Sqlite(value))
        }
    }
}

impl From<DbError> for EngineError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Db(other),
        }
    }
}

/// Busy and locked databases clear up once the competing writer commits.
fn is_transient(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}
