//! JSON REST handlers for presets.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use icv6_app::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, PresetRepository,
    ReconciliationLog,
};
use icv6_domain::error::Icv6Error;
use icv6_domain::lighting::{DeviceMode, Intensity, Program};
use icv6_domain::preset::{NewPreset, Preset, PresetId};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /api/presets`.
///
/// Only the payload matching `mode` is required.
#[derive(Deserialize)]
pub struct CreatePresetRequest {
    pub name: String,
    pub mode: String,
    pub intensity: Option<Intensity>,
    pub program: Option<Program>,
}

/// Request body for `PATCH /api/presets/{id}`.
#[derive(Deserialize)]
pub struct RenamePresetRequest {
    pub name: String,
}

/// Body returned after a preset was pushed to the device.
#[derive(Debug, Serialize)]
pub struct AppliedBody {
    pub status: &'static str,
    pub loaded: Preset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<u8>,
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Preset>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the rename endpoint.
pub enum RenameResponse {
    Ok,
}

impl IntoResponse for RenameResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok => Json(serde_json::json!({ "status": "ok" })).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/presets`
pub async fn list<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
) -> Result<Json<Vec<Preset>>, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let presets = state.preset_service.list_presets().await?;
    Ok(Json(presets))
}

/// `POST /api/presets`
pub async fn create<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Json(req): Json<CreatePresetRequest>,
) -> Result<CreateResponse, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let mode = DeviceMode::from_str(&req.mode).map_err(Icv6Error::from)?;
    let preset = NewPreset::from_parts(req.name, mode, req.intensity, req.program)?;
    let created = state.preset_service.create_preset(preset).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `POST /api/presets/{id}/apply`
pub async fn apply<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Path(id): Path<PresetId>,
) -> Result<Json<AppliedBody>, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    let applied = state.preset_service.apply_preset(id).await?;
    Ok(Json(AppliedBody {
        status: "ok",
        loaded: applied.preset,
        ack: applied.ack,
    }))
}

/// `PATCH /api/presets/{id}`
pub async fn rename<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Path(id): Path<PresetId>,
    Json(req): Json<RenamePresetRequest>,
) -> Result<RenameResponse, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    state.preset_service.rename_preset(id, req.name).await?;
    Ok(RenameResponse::Ok)
}

/// `DELETE /api/presets/{id}`
pub async fn delete<D, T, L, P, R>(
    State(state): State<AppState<D, T, L, P, R>>,
    Path(id): Path<PresetId>,
) -> Result<DeleteResponse, ApiError>
where
    D: LightingController + Send + Sync + 'static,
    T: ActiveTargetRepository + Send + Sync + 'static,
    L: ReconciliationLog + Send + Sync + 'static,
    P: PollingConfigRepository + Send + Sync + 'static,
    R: PresetRepository + Send + Sync + 'static,
{
    state.preset_service.delete_preset(id).await?;
    Ok(DeleteResponse::NoContent)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_support::{app, offline_app, send};

    fn parse(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    fn auto_body(name: &str) -> Value {
        json!({
            "name": name,
            "mode": "auto",
            "program": {"points": [
                {"index": 1, "hour": 8, "minute": 0, "ch1": 0, "ch2": 0, "ch3": 0, "ch4": 0}
            ]}
        })
    }

    fn manual_body(name: &str) -> Value {
        json!({
            "name": name,
            "mode": "manual",
            "intensity": {"ch1": 1, "ch2": 2, "ch3": 3, "ch4": 4}
        })
    }

    #[tokio::test]
    async fn should_reject_preset_without_payload_for_its_mode() {
        let router = app();

        let (status, body) = send(
            router.clone(),
            "POST",
            "/api/presets",
            Some(json!({"name": "x", "mode": "manual"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse(&body)["error"], "manual preset requires intensity");

        let (status, _) = send(
            router,
            "POST",
            "/api/presets",
            Some(json!({"name": "x2", "mode": "auto"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_run_full_preset_lifecycle() {
        let router = app();

        let create = Some(auto_body("reef-auto"));
        let (status, body) = send(router.clone(), "POST", "/api/presets", create).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = parse(&body)["id"].as_i64().unwrap();

        let (status, body) = send(router.clone(), "GET", "/api/presets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(parse(&body).as_array().unwrap().iter().any(|p| p["id"] == id));

        let uri = format!("/api/presets/{id}");
        let apply = format!("{uri}/apply");
        let (status, body) = send(router.clone(), "POST", &apply, None).await;
        assert_eq!(status, StatusCode::OK);
        let json = parse(&body);
        assert_eq!(json["loaded"]["mode"], "auto");
        assert_eq!(json["ack"], 1);

        let (status, body) = send(router.clone(), "GET", "/api/target", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["mode"], "auto");

        let (status, _) = send(
            router.clone(),
            "PATCH",
            &uri,
            Some(json!({"name": "reef-auto-2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(router.clone(), "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(router, "POST", &apply, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse(&body)["error"], "preset not found");
    }

    #[tokio::test]
    async fn should_return_400_for_duplicate_preset_name() {
        let router = app();

        let create = Some(manual_body("reef-dupe"));
        let (status, _) = send(router.clone(), "POST", "/api/presets", create.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(router, "POST", "/api/presets", create).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error = parse(&body)["error"].as_str().unwrap().to_string();
        assert!(error.contains("already exists"));
    }

    #[tokio::test]
    async fn should_return_404_when_renaming_or_deleting_unknown_preset() {
        let router = app();

        let (status, _) = send(
            router.clone(),
            "PATCH",
            "/api/presets/9",
            Some(json!({"name": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(router, "DELETE", "/api/presets/9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_502_when_applying_to_unreachable_device() {
        let (status, body) = send(offline_app(), "POST", "/api/presets/1/apply", None).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(parse(&body)["kind"], "device");
    }
}
