//! Preset service: use-cases for managing and applying named presets.

use std::sync::Arc;

use icv6_domain::error::{Icv6Error, NotFoundError};
use icv6_domain::preset::{NewPreset, Preset, PresetId, validate_name};
use icv6_domain::target::ActiveTarget;

use crate::ports::{ActiveTargetRepository, LightingController, PresetRepository};
use crate::services::device_service::DeviceService;

/// Result of applying a preset to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPreset {
    pub preset: Preset,
    /// Device acknowledgement byte, for program uploads.
    pub ack: Option<u8>,
}

/// Application service for preset CRUD and apply.
///
/// Applying goes through [`DeviceService`], so the active target follows the
/// applied preset exactly as an interactive write would.
pub struct PresetService<D, T, R> {
    presets: R,
    device: Arc<DeviceService<D, T>>,
}

fn not_found() -> Icv6Error {
    NotFoundError { entity: "preset" }.into()
}

impl<D, T, R> PresetService<D, T, R>
where
    D: LightingController,
    T: ActiveTargetRepository,
    R: PresetRepository,
{
    /// Create a new service sharing the given device service.
    pub fn new(presets: R, device: Arc<DeviceService<D, T>>) -> Self {
        Self { presets, device }
    }

    /// All presets, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the repository.
    pub async fn list_presets(&self) -> Result<Vec<Preset>, Icv6Error> {
        self.presets.list().await
    }

    /// Store a new preset after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Validation`] if invariants fail or the name is
    /// taken, or a storage error from the repository.
    #[tracing::instrument(skip(self, preset), fields(name = %preset.name))]
    pub async fn create_preset(&self, preset: NewPreset) -> Result<Preset, Icv6Error> {
        preset.validate()?;
        let stored = self.presets.create(preset).await?;
        tracing::info!(id = stored.id, mode = %stored.mode(), "preset created");
        Ok(stored)
    }

    /// Look up a preset by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::NotFound`] when no preset with `id` exists, or a
    /// storage error from the repository.
    pub async fn get_preset(&self, id: PresetId) -> Result<Preset, Icv6Error> {
        self.presets.get(id).await?.ok_or_else(not_found)
    }

    /// Push a preset to the device and make it the active target.
    ///
    /// The device is first switched to the preset's mode, then sent its
    /// intensity or program.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::NotFound`] for an unknown id, a device error if
    /// any exchange fails, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn apply_preset(&self, id: PresetId) -> Result<AppliedPreset, Icv6Error> {
        let preset = self.get_preset(id).await?;
        self.device.set_mode(preset.mode()).await?;
        let ack = match &preset.target {
            ActiveTarget::Manual { intensity } => {
                self.device.set_manual_intensity(*intensity).await?;
                None
            }
            ActiveTarget::Auto { program } => {
                Some(self.device.set_program(program.clone()).await?)
            }
        };
        tracing::info!(name = %preset.name, "preset applied");
        Ok(AppliedPreset { preset, ack })
    }

    /// Rename a preset.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Validation`] for a bad or taken name,
    /// [`Icv6Error::NotFound`] for an unknown id, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn rename_preset(&self, id: PresetId, name: String) -> Result<(), Icv6Error> {
        validate_name(&name)?;
        if self.presets.rename(id, name).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    }

    /// Delete a preset.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::NotFound`] for an unknown id, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_preset(&self, id: PresetId) -> Result<(), Icv6Error> {
        if self.presets.delete(id).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    }
}
