//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod device;
#[allow(clippy::missing_errors_doc)]
pub mod presets;
#[allow(clippy::missing_errors_doc)]
pub mod reconciliation;

use axum::Router;
use axum::routing::{get, patch, post};

use icv6_app::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, PresetRepository,
    ReconciliationLog,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<D, T, L, P, R>() -> Router<AppState<D, T, L, P, R>>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    Router::new()
        // Device
        .route("/state", get(device::state::<D, T, L, P, R>))
        .route("/mode", post(device::set_mode::<D, T, L, P, R>))
        .route(
            "/manual/intensity",
            post(device::set_intensity::<D, T, L, P, R>),
        )
        .route("/manual/preview", post(device::preview::<D, T, L, P, R>))
        .route("/program", post(device::set_program::<D, T, L, P, R>))
        .route("/target", get(device::target::<D, T, L, P, R>))
        // Presets
        .route(
            "/presets",
            get(presets::list::<D, T, L, P, R>).post(presets::create::<D, T, L, P, R>),
        )
        .route(
            "/presets/{id}",
            patch(presets::rename::<D, T, L, P, R>).delete(presets::delete::<D, T, L, P, R>),
        )
        .route("/presets/{id}/apply", post(presets::apply::<D, T, L, P, R>))
        // Reconciliation
        .route("/reconciliation/run", post(reconciliation::run::<D, T, L, P, R>))
        .route(
            "/reconciliation/latest",
            get(reconciliation::latest::<D, T, L, P, R>),
        )
        .route(
            "/reconciliation/runs",
            get(reconciliation::runs::<D, T, L, P, R>),
        )
        .route(
            "/reconciliation/polling",
            get(reconciliation::polling::<D, T, L, P, R>)
                .post(reconciliation::set_polling::<D, T, L, P, R>),
        )
}
