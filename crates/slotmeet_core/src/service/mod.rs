//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep presentation and transport layers decoupled from storage details.

pub mod aggregate_service;
pub mod confirm_service;
