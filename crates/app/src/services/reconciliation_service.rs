//! Reconciliation service: on-demand checks, run history and polling settings.

use std::sync::Arc;

use icv6_domain::error::Icv6Error;
use icv6_domain::reconciliation::{PollingConfig, ReconciliationOutcome, ReconciliationRun};

use crate::engine::{EngineState, ReconciliationEngine};
use crate::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, ReconciliationLog,
};

/// Upper bound on how many runs a single history query returns.
pub const MAX_HISTORY: usize = 500;

/// Application service exposing the reconciliation engine to callers.
pub struct ReconciliationService<D, T, L, P> {
    engine: Arc<ReconciliationEngine<D, T, L, P>>,
}

impl<D, T, L, P> ReconciliationService<D, T, L, P>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
{
    /// Create a service sharing the given engine.
    pub fn new(engine: Arc<ReconciliationEngine<D, T, L, P>>) -> Self {
        Self { engine }
    }

    /// Run one reconciliation pass now and record its outcome.
    ///
    /// Runs regardless of whether polling is enabled.
    ///
    /// # Errors
    ///
    /// Propagates device or storage failures; nothing is recorded then.
    pub async fn run_now(&self) -> Result<ReconciliationOutcome, Icv6Error> {
        self.engine.reconciler().run_once().await
    }

    /// The most recent recorded run.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the run log.
    pub async fn latest(&self) -> Result<Option<ReconciliationRun>, Icv6Error> {
        self.engine.reconciler().log().latest().await
    }

    /// Recorded runs, newest first, capped at [`MAX_HISTORY`].
    ///
    /// # Errors
    ///
    /// Returns a storage error from the run log.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ReconciliationRun>, Icv6Error> {
        self.engine
            .reconciler()
            .log()
            .recent(limit.min(MAX_HISTORY))
            .await
    }

    /// Current polling settings.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the settings store.
    pub async fn polling_config(&self) -> Result<PollingConfig, Icv6Error> {
        self.engine.polling().get().await
    }

    /// Replace the polling settings. The loop picks them up on its next cycle.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Validation`] for an out-of-range interval, or a
    /// storage error from the settings store.
    #[tracing::instrument(skip(self))]
    pub async fn set_polling_config(
        &self,
        config: PollingConfig,
    ) -> Result<PollingConfig, Icv6Error> {
        config.validate()?;
        let stored = self.engine.polling().set(config).await?;
        tracing::info!(
            enabled = stored.enabled,
            interval_minutes = stored.interval_minutes,
            "polling settings updated"
        );
        Ok(stored)
    }

    /// Whether the background loop is alive.
    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }
}
