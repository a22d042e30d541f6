//! Axum router assembly and health endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use icv6_app::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, PresetRepository,
    ReconciliationLog,
};
use icv6_domain::error::Icv6Error;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and serves the health checks at the root.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<D, T, L, P, R>(state: AppState<D, T, L, P, R>) -> Router
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(dependency_check::<D, T, L, P, R>))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Body of `GET /healthz`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub db: String,
    pub device: String,
}

fn probe<V>(result: Result<V, Icv6Error>) -> String {
    match result {
        Ok(_) => "ok".to_string(),
        Err(err) => format!("error:{}", err.report()),
    }
}

/// Report database and device reachability.
///
/// Always answers `200`; a failing dependency turns the status `degraded`.
async fn dependency_check<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
) -> Json<HealthReport>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let db = probe(state.reconciliation_service.latest().await);
    let device = probe(state.device_service.ping().await);
    let status = if db == "ok" && device == "ok" {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthReport { status, db, device })
}
