//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate domain invariants before persistence.
//! - Storage lock timeouts surface as retryable errors, never as panics.

pub mod event_repo;
pub mod selection_repo;
