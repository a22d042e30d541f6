//! Reconciler: one comparison of stored intent against live device state.
//!
//! A pass reads the active target, asks the device for its mode and (when in
//! auto mode) its program, and classifies the result. Every outcome,
//! including skips, is appended to the run log before being returned.

use icv6_domain::error::Icv6Error;
use icv6_domain::lighting::DeviceMode;
use icv6_domain::reconciliation::{ReconciliationOutcome, SkipReason};
use icv6_domain::target::ActiveTarget;
use icv6_domain::time::now;

use crate::ports::{ActiveTargetRepository, LightingController, ReconciliationLog};

/// Compares the stored program with the one the device reports.
pub struct Reconciler<D, T, L> {
    controller: D,
    targets: T,
    log: L,
}

impl<D, T, L> Reconciler<D, T, L>
where
    D: LightingController,
    T: ActiveTargetRepository,
    L: ReconciliationLog,
{
    /// Create a new reconciler.
    pub fn new(controller: D, targets: T, log: L) -> Self {
        Self {
            controller,
            targets,
            log,
        }
    }

    /// Borrow the run log.
    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn controller(&self) -> &D {
        &self.controller
    }

    /// Run a single pass and record its outcome.
    ///
    /// # Errors
    ///
    /// Propagates device, storage, or payload failures. Nothing is recorded
    /// for a failed pass; see [`run_recorded`](Self::run_recorded).
    #[tracing::instrument(skip(self))]
    pub async fn run_once(&self) -> Result<ReconciliationOutcome, Icv6Error> {
        let outcome = self.compare().await?;
        match &outcome {
            ReconciliationOutcome::Mismatch { .. } => {
                tracing::warn!("device program drifted from stored target");
            }
            other => tracing::info!(status = other.status(), "reconciliation finished"),
        }
        self.log.append(outcome.clone(), now()).await?;
        Ok(outcome)
    }

    /// Run a single pass, turning any failure into a recorded `error` outcome.
    ///
    /// Never fails: if even the error outcome cannot be stored, the storage
    /// failure is logged and the error outcome is still returned.
    pub async fn run_recorded(&self) -> ReconciliationOutcome {
        match self.run_once().await {
            Ok(outcome) => outcome,
            Err(err) => self.record_failure(&err).await,
        }
    }

    /// Append an `error` outcome describing `err`.
    pub async fn record_failure(&self, err: &Icv6Error) -> ReconciliationOutcome {
        tracing::error!(error = %err.report(), kind = err.kind(), "reconciliation cycle failed");
        let outcome = ReconciliationOutcome::from_error(err);
        if let Err(store_err) = self.log.append(outcome.clone(), now()).await {
            tracing::error!(error = %store_err.report(), "failed to record reconciliation error");
        }
        outcome
    }

    async fn compare(&self) -> Result<ReconciliationOutcome, Icv6Error> {
        let expected = match self.targets.get().await? {
            Some(ActiveTarget::Auto { program }) => program,
            Some(ActiveTarget::Manual { .. }) | None => {
                return Ok(ReconciliationOutcome::Skipped(SkipReason::NoActiveProgram));
            }
        };

        let mode = self.controller.query_mode().await?;
        if mode != DeviceMode::Auto {
            return Ok(ReconciliationOutcome::Skipped(
                SkipReason::DeviceNotInAutoMode { mode },
            ));
        }

        let reported = self.controller.query_program().await?;
        if reported.matches(&expected) {
            Ok(ReconciliationOutcome::Ok {
                program: reported.canonical(),
            })
        } else {
            Ok(ReconciliationOutcome::Mismatch {
                expected: expected.canonical(),
                reported: reported.canonical(),
            })
        }
    }
}
