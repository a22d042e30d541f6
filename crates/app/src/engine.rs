//! Reconciliation engine: the autonomous background loop.
//!
//! The engine owns a [`Reconciler`] and, while running, repeats:
//!
//! 1. re-read the [`PollingConfig`] (so changes apply without a restart)
//! 2. if enabled, run one recorded pass; failures become `error` outcomes
//! 3. wait for the configured interval, or until [`stop`](ReconciliationEngine::stop)
//!
//! A cycle in flight is never interrupted; cancellation is only observed
//! between cycles and during the interval wait.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use icv6_domain::reconciliation::{MAX_INTERVAL_MINUTES, PollingConfig};

use crate::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, ReconciliationLog,
};
use crate::reconciler::Reconciler;

/// Wait used when the polling config itself cannot be read.
const FALLBACK_INTERVAL: Duration = Duration::from_secs(60);

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Running,
}

/// Background loop driving periodic reconciliation.
///
/// `start` and `stop` serialise on one async lock that `stop` holds until the
/// loop has exited, so at most one loop is ever alive per engine.
pub struct ReconciliationEngine<D, T, L, P> {
    reconciler: Arc<Reconciler<D, T, L>>,
    polling: Arc<P>,
    worker: Mutex<Option<Worker>>,
}

impl<D, T, L, P> ReconciliationEngine<D, T, L, P>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
{
    /// Create a stopped engine.
    pub fn new(reconciler: Reconciler<D, T, L>, polling: P) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
            polling: Arc::new(polling),
            worker: Mutex::new(None),
        }
    }

    /// The reconciler used by the loop, also usable for on-demand passes.
    pub fn reconciler(&self) -> &Reconciler<D, T, L> {
        &self.reconciler
    }

    /// The polling settings store read by the loop.
    pub fn polling(&self) -> &P {
        &self.polling
    }

    /// Whether a loop is currently alive.
    ///
    /// Reports [`EngineState::Running`] while a `stop` is still waiting for
    /// the loop to exit.
    pub fn state(&self) -> EngineState {
        let Ok(worker) = self.worker.try_lock() else {
            return EngineState::Running;
        };
        match worker.as_ref() {
            Some(w) if !w.handle.is_finished() => EngineState::Running,
            _ => EngineState::Stopped,
        }
    }

    /// Spawn the loop unless one is already running.
    ///
    /// Returns `true` when a new loop was spawned. Waits for a concurrent
    /// [`stop`](Self::stop) to complete first.
    pub async fn start(&self) -> bool {
        let mut worker = self.worker.lock().await;
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            tracing::debug!("reconciliation loop already running");
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.reconciler),
            Arc::clone(&self.polling),
            cancel.clone(),
        ));
        *worker = Some(Worker { cancel, handle });
        tracing::info!("reconciliation loop started");
        true
    }

    /// Signal the loop to end and wait until it has exited.
    ///
    /// An in-flight cycle is allowed to finish; the interval wait is cut
    /// short. Calling `stop` on a stopped engine is a no-op.
    pub async fn stop(&self) {
        let mut worker = self.worker.lock().await;
        let Some(current) = worker.as_mut() else {
            return;
        };

        current.cancel.cancel();
        if let Err(err) = (&mut current.handle).await {
            tracing::error!(error = %err, "reconciliation loop terminated abnormally");
        }
        *worker = None;
        tracing::info!("reconciliation loop stopped");
    }
}

fn bounded_interval(config: PollingConfig) -> Duration {
    let max = PollingConfig {
        enabled: true,
        interval_minutes: MAX_INTERVAL_MINUTES,
    };
    config.interval().min(max.interval())
}

async fn run_loop<D, T, L, P>(
    reconciler: Arc<Reconciler<D, T, L>>,
    polling: Arc<P>,
    cancel: CancellationToken,
) where
    D: LightingController,
    T: ActiveTargetRepository,
    L: ReconciliationLog,
    P: PollingConfigRepository,
{
    while !cancel.is_cancelled() {
        let interval = match polling.get().await {
            Ok(config) if config.enabled => {
                reconciler.run_recorded().await;
                bounded_interval(config)
            }
            Ok(config) => {
                tracing::debug!("reconciliation polling disabled");
                bounded_interval(config)
            }
            Err(err) => {
                reconciler.record_failure(&err).await;
                FALLBACK_INTERVAL
            }
        };

        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }
}
