//! Shared application state for axum handlers.

use std::sync::Arc;

use icv6_app::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, PresetRepository,
    ReconciliationLog,
};
use icv6_app::services::device_service::DeviceService;
use icv6_app::services::preset_service::PresetService;
use icv6_app::services::reconciliation_service::ReconciliationService;

/// Application state shared across all axum handlers.
///
/// Generic over the controller, target store, run log, polling store and
/// preset store to avoid dynamic dispatch. `Clone` is implemented manually so
/// the underlying types themselves do not need to be `Clone`; only the `Arc`
/// wrappers are cloned.
pub struct AppState<D, T, L, P, R> {
    /// Interactive device control.
    pub device_service: Arc<DeviceService<D, T>>,
    /// On-demand checks, history and polling settings.
    pub reconciliation_service: Arc<ReconciliationService<D, T, L, P>>,
    /// Named presets.
    pub preset_service: Arc<PresetService<D, T, R>>,
}

impl<D, T, L, P, R> Clone for AppState<D, T, L, P, R> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            reconciliation_service: Arc::clone(&self.reconciliation_service),
            preset_service: Arc::clone(&self.preset_service),
        }
    }
}

impl<D, T, L, P, R> AppState<D, T, L, P, R>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    ///
    /// The device service is shared because preset apply writes through it.
    pub fn new(
        device_service: Arc<DeviceService<D, T>>,
        reconciliation_service: ReconciliationService<D, T, L, P>,
        preset_service: PresetService<D, T, R>,
    ) -> Self {
        Self {
            device_service,
            reconciliation_service: Arc::new(reconciliation_service),
            preset_service: Arc::new(preset_service),
        }
    }
}
