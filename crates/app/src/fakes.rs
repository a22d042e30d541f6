//! In-memory port implementations shared by the unit tests.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use icv6_domain::error::{Icv6Error, ValidationError};
use icv6_domain::lighting::{DeviceMode, Intensity, Program, ProgramPoint};
use icv6_domain::preset::{NewPreset, Preset, PresetId};
use icv6_domain::reconciliation::{PollingConfig, ReconciliationOutcome, ReconciliationRun};
use icv6_domain::target::ActiveTarget;
use icv6_domain::time::{Timestamp, now};

use crate::ports::{
    ActiveTargetRepository, LightingController, PollingConfigRepository, PresetRepository,
    ReconciliationLog,
};

pub(crate) fn point(index: u8, hour: u8, minute: u8) -> ProgramPoint {
    ProgramPoint {
        index,
        hour,
        minute,
        ch1: 20,
        ch2: 40,
        ch3: 60,
        ch4: 80,
    }
}

pub(crate) fn program() -> Program {
    Program::new(vec![point(1, 8, 0), point(2, 12, 30), point(3, 20, 15)])
}

fn unreachable_device() -> Icv6Error {
    Icv6Error::Device(Box::new(std::io::Error::other("device unreachable")))
}

// ── Controller ─────────────────────────────────────────────────────

pub(crate) struct FakeController {
    mode: Mutex<DeviceMode>,
    intensity: Mutex<Intensity>,
    preview: Mutex<Option<Intensity>>,
    program: Mutex<Program>,
    failing: bool,
    calls: AtomicUsize,
    mode_delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeController {
    fn new(mode: DeviceMode, program: Program, failing: bool) -> Self {
        Self {
            mode: Mutex::new(mode),
            intensity: Mutex::new(Intensity::from_channels([0, 0, 0, 0])),
            preview: Mutex::new(None),
            program: Mutex::new(program),
            failing,
            calls: AtomicUsize::new(0),
            mode_delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// An auto-mode device whose mode query takes `delay` to answer.
    pub(crate) fn slow(program: Program, delay: Duration) -> Self {
        Self {
            mode_delay: delay,
            ..Self::auto(program)
        }
    }

    /// Highest number of mode queries observed in flight at once.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn auto(program: Program) -> Self {
        Self::new(DeviceMode::Auto, program, false)
    }

    pub(crate) fn manual() -> Self {
        Self::new(DeviceMode::Manual, Program::default(), false)
    }

    pub(crate) fn failing() -> Self {
        Self::new(DeviceMode::Auto, Program::default(), true)
    }

    /// Number of device exchanges attempted so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn preview(&self) -> Option<Intensity> {
        *self.preview.lock().unwrap()
    }

    pub(crate) fn stored_program(&self) -> Program {
        self.program.lock().unwrap().clone()
    }

    fn exchange<R>(&self, f: impl FnOnce() -> R) -> Result<R, Icv6Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(unreachable_device());
        }
        Ok(f())
    }
}

impl LightingController for FakeController {
    fn query_mode(&self) -> impl Future<Output = Result<DeviceMode, Icv6Error>> + Send {
        async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            if !self.mode_delay.is_zero() {
                tokio::time::sleep(self.mode_delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.exchange(|| *self.mode.lock().unwrap())
        }
    }

    fn set_mode(&self, mode: DeviceMode) -> impl Future<Output = Result<(), Icv6Error>> + Send {
        let r = self.exchange(|| *self.mode.lock().unwrap() = mode);
        async { r }
    }

    fn query_intensity(&self) -> impl Future<Output = Result<Intensity, Icv6Error>> + Send {
        let r = self.exchange(|| *self.intensity.lock().unwrap());
        async { r }
    }

    fn set_intensity(
        &self,
        intensity: Intensity,
    ) -> impl Future<Output = Result<(), Icv6Error>> + Send {
        let r = self.exchange(|| *self.intensity.lock().unwrap() = intensity);
        async { r }
    }

    fn set_preview_intensity(
        &self,
        intensity: Intensity,
    ) -> impl Future<Output = Result<(), Icv6Error>> + Send {
        let r = self.exchange(|| *self.preview.lock().unwrap() = Some(intensity));
        async { r }
    }

    fn query_program(&self) -> impl Future<Output = Result<Program, Icv6Error>> + Send {
        let r = self.exchange(|| self.program.lock().unwrap().clone());
        async { r }
    }

    fn set_program(
        &self,
        program: &Program,
    ) -> impl Future<Output = Result<u8, Icv6Error>> + Send {
        let r = self.exchange(|| {
            *self.program.lock().unwrap() = program.canonical();
            1
        });
        async { r }
    }
}

// ── Active target ──────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryTargets {
    target: Mutex<Option<ActiveTarget>>,
}

impl InMemoryTargets {
    pub(crate) fn with(target: Option<ActiveTarget>) -> Self {
        Self {
            target: Mutex::new(target),
        }
    }

    pub(crate) fn current(&self) -> Option<ActiveTarget> {
        self.target.lock().unwrap().clone()
    }
}

impl ActiveTargetRepository for InMemoryTargets {
    fn get(&self) -> impl Future<Output = Result<Option<ActiveTarget>, Icv6Error>> + Send {
        let r = self.target.lock().unwrap().clone();
        async { Ok(r) }
    }

    fn upsert(
        &self,
        target: ActiveTarget,
    ) -> impl Future<Output = Result<ActiveTarget, Icv6Error>> + Send {
        *self.target.lock().unwrap() = Some(target.clone());
        async { Ok(target) }
    }
}

// ── Run log ────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryLog {
    runs: Mutex<Vec<ReconciliationRun>>,
}

impl InMemoryLog {
    pub(crate) fn runs(&self) -> Vec<ReconciliationRun> {
        self.runs.lock().unwrap().clone()
    }
}

impl ReconciliationLog for InMemoryLog {
    fn append(
        &self,
        outcome: ReconciliationOutcome,
        checked_at: Timestamp,
    ) -> impl Future<Output = Result<ReconciliationRun, Icv6Error>> + Send {
        let mut runs = self.runs.lock().unwrap();
        let run = ReconciliationRun {
            id: i64::try_from(runs.len()).unwrap() + 1,
            checked_at,
            outcome,
        };
        runs.push(run.clone());
        async { Ok(run) }
    }

    fn latest(
        &self,
    ) -> impl Future<Output = Result<Option<ReconciliationRun>, Icv6Error>> + Send {
        let r = self.runs.lock().unwrap().last().cloned();
        async { Ok(r) }
    }

    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ReconciliationRun>, Icv6Error>> + Send {
        let r: Vec<_> = self
            .runs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect();
        async { Ok(r) }
    }
}

// ── Polling config ─────────────────────────────────────────────────

pub(crate) struct InMemoryPolling {
    config: Mutex<PollingConfig>,
    failing: bool,
}

impl InMemoryPolling {
    pub(crate) fn with(config: PollingConfig) -> Self {
        Self {
            config: Mutex::new(config),
            failing: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            config: Mutex::new(PollingConfig::default()),
            failing: true,
        }
    }
}

impl PollingConfigRepository for InMemoryPolling {
    fn get(&self) -> impl Future<Output = Result<PollingConfig, Icv6Error>> + Send {
        let r = if self.failing {
            Err(Icv6Error::Storage(Box::new(std::io::Error::other(
                "settings table locked",
            ))))
        } else {
            Ok(*self.config.lock().unwrap())
        };
        async { r }
    }

    fn set(
        &self,
        config: PollingConfig,
    ) -> impl Future<Output = Result<PollingConfig, Icv6Error>> + Send {
        *self.config.lock().unwrap() = config;
        async move { Ok(config) }
    }
}

// ── Presets ────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryPresets {
    presets: Mutex<Vec<Preset>>,
}

impl InMemoryPresets {
    pub(crate) fn names(&self) -> Vec<String> {
        self.presets
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }
}

fn duplicate(presets: &[Preset], name: &str, except: Option<PresetId>) -> bool {
    presets
        .iter()
        .any(|p| p.name == name && Some(p.id) != except)
}

impl PresetRepository for InMemoryPresets {
    fn create(&self, preset: NewPreset) -> impl Future<Output = Result<Preset, Icv6Error>> + Send {
        let mut presets = self.presets.lock().unwrap();
        let r = if duplicate(&presets, &preset.name, None) {
            Err(ValidationError::DuplicateName(preset.name).into())
        } else {
            let stored = Preset {
                id: presets.last().map_or(1, |p| p.id + 1),
                name: preset.name,
                target: preset.target,
                created_at: now(),
            };
            presets.push(stored.clone());
            Ok(stored)
        };
        async { r }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Preset>, Icv6Error>> + Send {
        let r: Vec<_> = self.presets.lock().unwrap().iter().rev().cloned().collect();
        async { Ok(r) }
    }

    fn get(&self, id: PresetId) -> impl Future<Output = Result<Option<Preset>, Icv6Error>> + Send {
        let r = self
            .presets
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned();
        async { Ok(r) }
    }

    fn rename(
        &self,
        id: PresetId,
        name: String,
    ) -> impl Future<Output = Result<bool, Icv6Error>> + Send {
        let mut presets = self.presets.lock().unwrap();
        let r = if duplicate(&presets, &name, Some(id)) {
            Err(ValidationError::DuplicateName(name).into())
        } else if let Some(preset) = presets.iter_mut().find(|p| p.id == id) {
            preset.name = name;
            Ok(true)
        } else {
            Ok(false)
        };
        async { r }
    }

    fn delete(&self, id: PresetId) -> impl Future<Output = Result<bool, Icv6Error>> + Send {
        let mut presets = self.presets.lock().unwrap();
        let before = presets.len();
        presets.retain(|p| p.id != id);
        let r = presets.len() != before;
        async move { Ok(r) }
    }
}
