//! JSON REST handlers for reconciliation runs and polling settings.

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use icv6_app::engine::EngineState;
use icv6_app::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, PresetRepository,
    ReconciliationLog,
};
use icv6_domain::error::{Icv6Error, NotFoundError};
use icv6_domain::reconciliation::{PollingConfig, ReconciliationOutcome, ReconciliationRun};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_RUNS_LIMIT: usize = 20;

fn default_limit() -> usize {
    DEFAULT_RUNS_LIMIT
}

/// Query parameters for `GET /api/reconciliation/runs`.
#[derive(Deserialize)]
pub struct RunsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Polling settings together with the live state of the loop.
#[derive(Debug, Serialize)]
pub struct PollingView {
    #[serde(flatten)]
    pub config: PollingConfig,
    pub engine: &'static str,
}

fn engine_label(state: EngineState) -> &'static str {
    match state {
        EngineState::Running => "running",
        EngineState::Stopped => "stopped",
    }
}

/// `POST /api/reconciliation/run`
pub async fn run<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
) -> Result<Json<ReconciliationOutcome>, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let outcome = state.reconciliation_service.run_now().await?;
    Ok(Json(outcome))
}

/// `GET /api/reconciliation/latest`
pub async fn latest<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
) -> Result<Json<ReconciliationRun>, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let run = state
        .reconciliation_service
        .latest()
        .await?
        .ok_or(Icv6Error::NotFound(NotFoundError {
            entity: "reconciliation run",
        }))?;
    Ok(Json(run))
}

/// `GET /api/reconciliation/runs?limit=N`
pub async fn runs<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Query(query): Query<RunsQuery>,
) -> Result<Json<Vec<ReconciliationRun>>, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let runs = state.reconciliation_service.recent(query.limit).await?;
    Ok(Json(runs))
}

/// `GET /api/reconciliation/polling`
pub async fn polling<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
) -> Result<Json<PollingView>, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let service = &state.reconciliation_service;
    let config = service.polling_config().await?;
    Ok(Json(PollingView {
        config,
        engine: engine_label(service.engine_state()),
    }))
}

/// `POST /api/reconciliation/polling`
pub async fn set_polling<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Json(config): Json<PollingConfig>,
) -> Result<Json<PollingView>, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let service = &state.reconciliation_service;
    let config = service.set_polling_config(config).await?;
    Ok(Json(PollingView {
        config,
        engine: engine_label(service.engine_state()),
    }))
}
