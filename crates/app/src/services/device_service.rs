//! Device service: interactive reads and writes against the lighting device.

use icv6_domain::error::Icv6Error;
use icv6_domain::lighting::{DeviceMode, DeviceState, Intensity, Program};
use icv6_domain::target::ActiveTarget;

use crate::ports::{ActiveTargetRepository, LightingController};

/// Application service for operator-driven device control.
///
/// Writes that change what the device should be running are mirrored into the
/// active target so the reconciliation loop has something to compare against.
pub struct DeviceService<D, T> {
    controller: D,
    targets: T,
}

impl<D, T> DeviceService<D, T>
where
    D: LightingController,
    T: ActiveTargetRepository,
{
    /// Create a new service over the given controller and target store.
    pub fn new(controller: D, targets: T) -> Self {
        Self {
            controller,
            targets,
        }
    }

    /// Read what the device is running right now.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Device`] when any exchange fails.
    #[tracing::instrument(skip(self))]
    pub async fn get_state(&self) -> Result<DeviceState, Icv6Error> {
        let state = match self.controller.query_mode().await {
            Ok(DeviceMode::Manual) => self
                .controller
                .query_intensity()
                .await
                .map(|intensity| DeviceState::Manual { intensity }),
            Ok(DeviceMode::Auto) => self
                .controller
                .query_program()
                .await
                .map(|program| DeviceState::Auto { program }),
            Err(err) => Err(err),
        };
        state.inspect_err(|err| log_device_failure("read state", err))
    }

    /// Switch the device between manual and auto mode.
    ///
    /// The stored target is left untouched. It keeps naming the last
    /// intensity or program written, so callers switching to auto mode should
    /// not expect [`active_target`](Self::active_target) to change.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Device`] when the exchange fails.
    #[tracing::instrument(skip(self))]
    pub async fn set_mode(&self, mode: DeviceMode) -> Result<(), Icv6Error> {
        self.controller
            .set_mode(mode)
            .await
            .inspect_err(|err| log_device_failure("set mode", err))
    }

    /// Apply a manual intensity and remember it as the active target.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Validation`] for out-of-range channels, a device
    /// error if the exchange fails, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_manual_intensity(&self, intensity: Intensity) -> Result<Intensity, Icv6Error> {
        intensity.validate()?;
        self.controller
            .set_intensity(intensity)
            .await
            .inspect_err(|err| log_device_failure("set intensity", err))?;
        self.targets
            .upsert(ActiveTarget::Manual { intensity })
            .await?;
        Ok(intensity)
    }

    /// Send an intensity for live preview. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Validation`] for out-of-range channels or a device
    /// error if the exchange fails.
    #[tracing::instrument(skip(self))]
    pub async fn preview_intensity(&self, intensity: Intensity) -> Result<Intensity, Icv6Error> {
        intensity.validate()?;
        self.controller
            .set_preview_intensity(intensity)
            .await
            .inspect_err(|err| log_device_failure("preview intensity", err))?;
        Ok(intensity)
    }

    /// Upload a program and remember it as the active target.
    ///
    /// Returns the device acknowledgement byte.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Validation`] if a point is out of range, a device
    /// error if the upload fails, or a storage error from the repository.
    #[tracing::instrument(skip(self, program), fields(points = program.points.len()))]
    pub async fn set_program(&self, program: Program) -> Result<u8, Icv6Error> {
        program.validate()?;
        let program = program.canonical();
        let ack = self
            .controller
            .set_program(&program)
            .await
            .inspect_err(|err| log_device_failure("set program", err))?;
        tracing::debug!(ack, "program uploaded");
        self.targets.upsert(ActiveTarget::Auto { program }).await?;
        Ok(ack)
    }

    /// The stored target, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the repository.
    pub async fn active_target(&self) -> Result<Option<ActiveTarget>, Icv6Error> {
        self.targets.get().await
    }

    /// Probe the device with a cheap mode query.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Device`] when the device does not answer.
    pub async fn ping(&self) -> Result<DeviceMode, Icv6Error> {
        self.controller.query_mode().await
    }
}

fn log_device_failure(action: &str, err: &Icv6Error) {
    tracing::error!(action, error = %err.report(), "device exchange failed");
}
