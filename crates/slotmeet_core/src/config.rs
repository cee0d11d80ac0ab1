//! Engine configuration.
//!
//! # Responsibility
//! - Hold the tunable constants of the intensity function and store timeouts.
//! - Load configuration from JSON with per-field defaults.
//!
//! # Invariants
//! - `intensity.base` and `intensity.step` are finite and non-negative, and
//!   `base <= 1`.
//! - `store.busy_timeout_ms` is positive so no lock wait is unbounded or
//!   instantly failing.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_INTENSITY_BASE: f64 = 0.1;
pub const DEFAULT_INTENSITY_STEP: f64 = 0.1;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid engine config: {0}")]
    Invalid(String),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub intensity: IntensityConfig,
    pub store: StoreConfig,
    /// Log level override; `None` uses `default_log_level()`.
    pub log_level: Option<String>,
}

impl EngineConfig {
    /// Parses a JSON document; missing fields fall back to defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.intensity.validate()?;
        self.store.validate()
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| crate::logging::default_log_level())
    }
}

/// Constants of `intensity(n) = min(1, base + n * step)` for `n >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityConfig {
    pub base: f64,
    pub step: f64,
}

impl Default for IntensityConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_INTENSITY_BASE,
            step: DEFAULT_INTENSITY_STEP,
        }
    }
}

impl IntensityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base.is_finite() || !self.step.is_finite() {
            return Err(ConfigError::Invalid(
                "intensity base/step must be finite".to_string(),
            ));
        }
        if self.base < 0.0 || self.step < 0.0 {
            return Err(ConfigError::Invalid(
                "intensity base/step must not be negative".to_string(),
            ));
        }
        if self.base > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "intensity base {} exceeds 1.0",
                self.base
            )));
        }
        Ok(())
    }

    /// Normalized weight for a slot selected by `participant_count` people.
    ///
    /// Zero participants map to `0.0`; everything else saturates at `1.0`.
    pub fn intensity(&self, participant_count: usize) -> f64 {
        if participant_count == 0 {
            return 0.0;
        }
        (self.base + participant_count as f64 * self.step).clamp(0.0, 1.0)
    }
}

/// Selection store connection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound on waiting for the database write lock.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.busy_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
