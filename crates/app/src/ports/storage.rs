//! Storage port: the persistence facade consumed by the core.
//!
//! The core only reads the active target and polling config and appends
//! runs; the write side and presets are driven by interactive callers.

use std::future::Future;

use icv6_domain::error::Icv6Error;
use icv6_domain::preset::{NewPreset, Preset, PresetId};
use icv6_domain::reconciliation::{PollingConfig, ReconciliationOutcome, ReconciliationRun};
use icv6_domain::target::ActiveTarget;
use icv6_domain::time::Timestamp;

/// Single-row store for the last intended configuration.
pub trait ActiveTargetRepository {
    /// Read the stored target, if any.
    fn get(&self) -> impl Future<Output = Result<Option<ActiveTarget>, Icv6Error>> + Send;

    /// Replace the stored target (last write wins).
    fn upsert(
        &self,
        target: ActiveTarget,
    ) -> impl Future<Output = Result<ActiveTarget, Icv6Error>> + Send;
}

/// Append-only log of reconciliation outcomes.
pub trait ReconciliationLog {
    /// Persist an outcome observed at `checked_at`.
    fn append(
        &self,
        outcome: ReconciliationOutcome,
        checked_at: Timestamp,
    ) -> impl Future<Output = Result<ReconciliationRun, Icv6Error>> + Send;

    /// Most recent run, if any.
    fn latest(&self) -> impl Future<Output = Result<Option<ReconciliationRun>, Icv6Error>> + Send;

    /// Most recent runs, newest first.
    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ReconciliationRun>, Icv6Error>> + Send;
}

/// Runtime-mutable polling settings for the background loop.
pub trait PollingConfigRepository {
    /// Current settings, falling back to defaults when none are stored.
    fn get(&self) -> impl Future<Output = Result<PollingConfig, Icv6Error>> + Send;

    /// Persist new settings.
    fn set(
        &self,
        config: PollingConfig,
    ) -> impl Future<Output = Result<PollingConfig, Icv6Error>> + Send;
}

/// Named presets.
pub trait PresetRepository {
    /// Store a new preset.
    ///
    /// A name already in use yields `ValidationError::DuplicateName`.
    fn create(&self, preset: NewPreset) -> impl Future<Output = Result<Preset, Icv6Error>> + Send;

    /// All presets, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Preset>, Icv6Error>> + Send;

    /// Look up a preset by id.
    fn get(&self, id: PresetId) -> impl Future<Output = Result<Option<Preset>, Icv6Error>> + Send;

    /// Rename a preset. Returns `false` when `id` does not exist.
    fn rename(
        &self,
        id: PresetId,
        name: String,
    ) -> impl Future<Output = Result<bool, Icv6Error>> + Send;

    /// Delete a preset. Returns `false` when `id` does not exist.
    fn delete(&self, id: PresetId) -> impl Future<Output = Result<bool, Icv6Error>> + Send;
}
