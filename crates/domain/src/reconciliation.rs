//! Reconciliation: comparing the stored intent with what the device reports.
//!
//! Every comparison produces exactly one [`ReconciliationOutcome`]. Outcomes
//! are appended to a run log as [`ReconciliationRun`]s for audit.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Icv6Error, ValidationError};
use crate::lighting::{DeviceMode, Program};
use crate::time::Timestamp;

/// Why a reconciliation pass did not compare programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// No target is stored, or the stored target carries no program.
    NoActiveProgram,
    /// The device is not running its program.
    DeviceNotInAutoMode { mode: DeviceMode },
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    Skipped(SkipReason),
    /// The device runs the intended program.
    Ok { program: Program },
    /// The device program drifted from the intended one.
    Mismatch { expected: Program, reported: Program },
    /// The pass itself failed.
    Error { message: String, kind: String },
}

impl ReconciliationOutcome {
    /// Convert a failed pass into an `error` outcome.
    #[must_use]
    pub fn from_error(err: &Icv6Error) -> Self {
        Self::Error {
            message: err.report(),
            kind: err.kind().to_string(),
        }
    }

    /// Status tag, as stored alongside each run.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Skipped(_) => "skipped",
            Self::Ok { .. } => "ok",
            Self::Mismatch { .. } => "mismatch",
            Self::Error { .. } => "error",
        }
    }
}

/// A persisted outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRun {
    pub id: i64,
    pub checked_at: Timestamp,
    pub outcome: ReconciliationOutcome,
}

/// Upper bound for the polling interval (one day).
pub const MAX_INTERVAL_MINUTES: u32 = 1440;

/// Settings for the background reconciliation loop, re-read every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    pub enabled: bool,
    pub interval_minutes: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: 1,
        }
    }
}

impl PollingConfig {
    /// Build a config, checking the interval bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IntervalOutOfRange`] if the interval is
    /// outside `1..=1440`.
    pub fn new(enabled: bool, interval_minutes: u32) -> Result<Self, Icv6Error> {
        let config = Self {
            enabled,
            interval_minutes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IntervalOutOfRange`] if the interval is
    /// outside `1..=1440`.
    pub fn validate(&self) -> Result<(), Icv6Error> {
        if !(1..=MAX_INTERVAL_MINUTES).contains(&self.interval_minutes) {
            return Err(ValidationError::IntervalOutOfRange(self.interval_minutes).into());
        }
        Ok(())
    }

    /// Wait between two cycles. Never shorter than one minute.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_minutes.max(1)) * 60)
    }
}
