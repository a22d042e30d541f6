//! JSON REST handlers for interactive device control.

use std::str::FromStr;

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use icv6_app::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, PresetRepository,
    ReconciliationLog,
};
use icv6_domain::error::{Icv6Error, NotFoundError};
use icv6_domain::lighting::{DeviceMode, DeviceState, Intensity, Program};
use icv6_domain::target::ActiveTarget;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /api/mode`.
#[derive(Deserialize)]
pub struct SetModeRequest {
    pub mode: String,
}

/// Acknowledgement returned by the write endpoints.
#[derive(Debug, Serialize)]
pub struct Applied {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<DeviceMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<u8>,
}

impl Applied {
    fn ok() -> Self {
        Self {
            status: "ok",
            mode: None,
            intensity: None,
            ack: None,
        }
    }
}

/// Possible responses from the write endpoints.
pub enum WriteResponse {
    Ok(Json<Applied>),
}

impl IntoResponse for WriteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/state`
pub async fn state<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
) -> Result<Json<DeviceState>, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let device_state = state.device_service.get_state().await?;
    Ok(Json(device_state))
}

/// `POST /api/mode`
pub async fn set_mode<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Json(req): Json<SetModeRequest>,
) -> Result<WriteResponse, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let mode = DeviceMode::from_str(&req.mode).map_err(Icv6Error::from)?;
    state.device_service.set_mode(mode).await?;
    Ok(WriteResponse::Ok(Json(Applied {
        mode: Some(mode),
        ..Applied::ok()
    })))
}

/// `POST /api/manual/intensity`
pub async fn set_intensity<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Json(intensity): Json<Intensity>,
) -> Result<WriteResponse, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let intensity = state.device_service.set_manual_intensity(intensity).await?;
    Ok(WriteResponse::Ok(Json(Applied {
        intensity: Some(intensity),
        ..Applied::ok()
    })))
}

/// `POST /api/manual/preview`
pub async fn preview<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Json(intensity): Json<Intensity>,
) -> Result<WriteResponse, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let intensity = state.device_service.preview_intensity(intensity).await?;
    Ok(WriteResponse::Ok(Json(Applied {
        intensity: Some(intensity),
        ..Applied::ok()
    })))
}

/// `POST /api/program`
pub async fn set_program<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Json(program): Json<Program>,
) -> Result<WriteResponse, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let ack = state.device_service.set_program(program).await?;
    Ok(WriteResponse::Ok(Json(Applied {
        ack: Some(ack),
        ..Applied::ok()
    })))
}

/// `GET /api/target`
pub async fn target<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
) -> Result<Json<ActiveTarget>, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let target = state
        .device_service
        .active_target()
        .await?
        .ok_or(Icv6Error::NotFound(NotFoundError {
            entity: "active target",
        }))?;
    Ok(Json(target))
}
