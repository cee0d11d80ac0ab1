//! Availability aggregation engine for shared event scheduling.
//! This crate is the single source of truth for slot-grid and selection
//! invariants; presentation, identity and transport live elsewhere.

pub mod config;
pub mod db;
pub mod error;
pub mod grid;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, EngineConfig, IntensityConfig, StoreConfig};
pub use error::{EngineError, EngineResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::aggregate::{AggregateSlot, Heatmap, HeatmapCell, SlotParticipant};
pub use model::event::{Event, EventId, EventWindowError};
pub use model::participant::{Participant, ParticipantId};
pub use model::slot::{SlotId, SlotParseError};
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::selection_repo::{ParticipantSelection, SelectionStore, SqliteSelectionStore};
pub use service::aggregate_service::{build_heatmap, AggregateService};
pub use service::confirm_service::ConfirmService;

/// Confirmation service wired to SQLite repositories on one connection.
pub type SqliteConfirmService<'conn> =
    ConfirmService<SqliteEventRepository<'conn>, SqliteSelectionStore<'conn>>;

/// Builds a SQLite-backed confirmation service over a migrated connection.
///
/// # Errors
/// - `InvalidConfig` when `config` fails validation.
pub fn sqlite_confirm_service<'conn>(
    conn: &'conn rusqlite::Connection,
    config: &EngineConfig,
) -> EngineResult<SqliteConfirmService<'conn>> {
    config.validate()?;
    ConfirmService::new(
        SqliteEventRepository::new(conn),
        SqliteSelectionStore::new(conn),
        config.intensity,
    )
}

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
