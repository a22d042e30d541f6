//! In-memory stub ports and request helpers shared by the handler tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use icv6_app::engine::ReconciliationEngine;
use icv6_app::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, PresetRepository,
    ReconciliationLog,
};
use icv6_app::reconciler::Reconciler;
use icv6_app::services::device_service::DeviceService;
use icv6_app::services::preset_service::PresetService;
use icv6_app::services::reconciliation_service::ReconciliationService;
use icv6_domain::error::{Icv6Error, ValidationError};
use icv6_domain::lighting::{DeviceMode, Intensity, Program};
use icv6_domain::preset::{NewPreset, Preset, PresetId};
use icv6_domain::reconciliation::{PollingConfig, ReconciliationOutcome, ReconciliationRun};
use icv6_domain::target::ActiveTarget;
use icv6_domain::time::{Timestamp, now};

use crate::state::AppState;

struct DeviceSide {
    mode: DeviceMode,
    intensity: Intensity,
    program: Program,
}

#[derive(Clone)]
pub(crate) struct StubDevice {
    side: Arc<Mutex<DeviceSide>>,
    offline: bool,
}

impl StubDevice {
    fn new(offline: bool) -> Self {
        Self {
            side: Arc::new(Mutex::new(DeviceSide {
                mode: DeviceMode::Auto,
                intensity: Intensity::from_channels([0, 0, 0, 0]),
                program: Program::default(),
            })),
            offline,
        }
    }

    fn reach(&self) -> Result<std::sync::MutexGuard<'_, DeviceSide>, Icv6Error> {
        if self.offline {
            return Err(Icv6Error::Device(Box::new(std::io::Error::other(
                "device unreachable",
            ))));
        }
        Ok(self.side.lock().unwrap())
    }
}

impl LightingController for StubDevice {
    async fn query_mode(&self) -> Result<DeviceMode, Icv6Error> {
        Ok(self.reach()?.mode)
    }

    async fn set_mode(&self, mode: DeviceMode) -> Result<(), Icv6Error> {
        self.reach()?.mode = mode;
        Ok(())
    }

    async fn query_intensity(&self) -> Result<Intensity, Icv6Error> {
        Ok(self.reach()?.intensity)
    }

    async fn set_intensity(&self, intensity: Intensity) -> Result<(), Icv6Error> {
        self.reach()?.intensity = intensity;
        Ok(())
    }

    async fn set_preview_intensity(&self, _intensity: Intensity) -> Result<(), Icv6Error> {
        self.reach()?;
        Ok(())
    }

    async fn query_program(&self) -> Result<Program, Icv6Error> {
        Ok(self.reach()?.program.clone())
    }

    async fn set_program(&self, program: &Program) -> Result<u8, Icv6Error> {
        self.reach()?.program = program.clone();
        Ok(1)
    }
}

#[derive(Clone, Default)]
pub(crate) struct StubTargets(Arc<Mutex<Option<ActiveTarget>>>);

impl ActiveTargetRepository for StubTargets {
    async fn get(&self) -> Result<Option<ActiveTarget>, Icv6Error> {
        Ok(self.0.lock().unwrap().clone())
    }

    async fn upsert(&self, target: ActiveTarget) -> Result<ActiveTarget, Icv6Error> {
        *self.0.lock().unwrap() = Some(target.clone());
        Ok(target)
    }
}

#[derive(Default)]
pub(crate) struct StubLog(Mutex<Vec<ReconciliationRun>>);

impl ReconciliationLog for StubLog {
    async fn append(
        &self,
        outcome: ReconciliationOutcome,
        checked_at: Timestamp,
    ) -> Result<ReconciliationRun, Icv6Error> {
        let mut runs = self.0.lock().unwrap();
        let run = ReconciliationRun {
            id: i64::try_from(runs.len()).unwrap() + 1,
            checked_at,
            outcome,
        };
        runs.push(run.clone());
        Ok(run)
    }

    async fn latest(&self) -> Result<Option<ReconciliationRun>, Icv6Error> {
        Ok(self.0.lock().unwrap().last().cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ReconciliationRun>, Icv6Error> {
        Ok(self.0.lock().unwrap().iter().rev().take(limit).cloned().collect())
    }
}

#[derive(Default)]
pub(crate) struct StubPolling(Mutex<PollingConfig>);

impl PollingConfigRepository for StubPolling {
    async fn get(&self) -> Result<PollingConfig, Icv6Error> {
        Ok(*self.0.lock().unwrap())
    }

    async fn set(&self, config: PollingConfig) -> Result<PollingConfig, Icv6Error> {
        *self.0.lock().unwrap() = config;
        Ok(config)
    }
}

#[derive(Default)]
pub(crate) struct StubPresets(Mutex<Vec<Preset>>);

impl StubPresets {
    fn seeded(preset: NewPreset) -> Self {
        Self(Mutex::new(vec![Preset {
            id: 1,
            name: preset.name,
            target: preset.target,
            created_at: now(),
        }]))
    }
}

impl PresetRepository for StubPresets {
    async fn create(&self, preset: NewPreset) -> Result<Preset, Icv6Error> {
        let mut presets = self.0.lock().unwrap();
        if presets.iter().any(|p| p.name == preset.name) {
            return Err(ValidationError::DuplicateName(preset.name).into());
        }
        let stored = Preset {
            id: presets.last().map_or(1, |p| p.id + 1),
            name: preset.name,
            target: preset.target,
            created_at: now(),
        };
        presets.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Preset>, Icv6Error> {
        Ok(self.0.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn get(&self, id: PresetId) -> Result<Option<Preset>, Icv6Error> {
        Ok(self.0.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn rename(&self, id: PresetId, name: String) -> Result<bool, Icv6Error> {
        let mut presets = self.0.lock().unwrap();
        let Some(preset) = presets.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        preset.name = name;
        Ok(true)
    }

    async fn delete(&self, id: PresetId) -> Result<bool, Icv6Error> {
        let mut presets = self.0.lock().unwrap();
        let before = presets.len();
        presets.retain(|p| p.id != id);
        Ok(presets.len() != before)
    }
}

fn router(device: StubDevice, target: Option<ActiveTarget>, presets: StubPresets) -> Router {
    let targets = StubTargets(Arc::new(Mutex::new(target)));
    let reconciler = Reconciler::new(device.clone(), targets.clone(), StubLog::default());
    let engine = Arc::new(ReconciliationEngine::new(
        reconciler,
        StubPolling::default(),
    ));
    let device_service = Arc::new(DeviceService::new(device, targets));
    crate::router::build(AppState::new(
        Arc::clone(&device_service),
        ReconciliationService::new(engine),
        PresetService::new(presets, device_service),
    ))
}

/// Router over a reachable device with nothing stored.
pub(crate) fn app() -> Router {
    router(StubDevice::new(false), None, StubPresets::default())
}

/// Router over an unreachable device, with an auto target and a manual
/// preset (id 1) already stored.
pub(crate) fn offline_app() -> Router {
    router(
        StubDevice::new(true),
        Some(ActiveTarget::Auto {
            program: Program::default(),
        }),
        StubPresets::seeded(NewPreset {
            name: "dim".to_string(),
            target: ActiveTarget::Manual {
                intensity: Intensity::from_channels([1, 2, 3, 4]),
            },
        }),
    )
}

/// Send one request and return the status and body text.
pub(crate) async fn send(
    router: Router,
    method: &str,
    uri: &str,
    json: Option<serde_json::Value>,
) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match json {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
