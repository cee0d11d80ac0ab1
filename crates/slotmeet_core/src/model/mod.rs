//! Domain model for availability scheduling.
//!
//! # Responsibility
//! - Define the event descriptor, slot identity and participant identity.
//! - Define the derived aggregate views handed to the presentation layer.
//!
//! # Invariants
//! - Events are read-only inputs; the engine never edits a registered event.
//! - Aggregates are derived data and are never persisted.

pub mod aggregate;
pub mod event;
pub mod participant;
pub mod slot;
