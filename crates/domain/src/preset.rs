//! Presets: named, reusable targets an operator can apply in one step.

use serde::{Deserialize, Serialize};

use crate::error::{Icv6Error, ValidationError};
use crate::lighting::{DeviceMode, Intensity, Program};
use crate::target::ActiveTarget;
use crate::time::Timestamp;

/// Longest preset name accepted, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Storage-assigned preset identifier.
pub type PresetId = i64;

/// A stored preset.
///
/// Serialises flat: `{"id", "name", "mode", "intensity" | "program", "created_at"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    #[serde(flatten)]
    pub target: ActiveTarget,
    pub created_at: Timestamp,
}

impl Preset {
    #[must_use]
    pub fn mode(&self) -> DeviceMode {
        self.target.mode()
    }
}

/// A preset that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPreset {
    pub name: String,
    pub target: ActiveTarget,
}

impl NewPreset {
    /// Assemble a preset from loosely-typed request parts.
    ///
    /// The payload matching `mode` is required; the other one is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingPayload`] when the payload for `mode`
    /// is absent, or any name or payload validation failure.
    pub fn from_parts(
        name: impl Into<String>,
        mode: DeviceMode,
        intensity: Option<Intensity>,
        program: Option<Program>,
    ) -> Result<Self, Icv6Error> {
        let target = match (mode, intensity, program) {
            (DeviceMode::Manual, Some(intensity), _) => ActiveTarget::Manual { intensity },
            (DeviceMode::Auto, _, Some(program)) if !program.is_empty() => ActiveTarget::Auto {
                program: program.canonical(),
            },
            (DeviceMode::Manual, None, _) => {
                return Err(ValidationError::MissingPayload {
                    mode: "manual",
                    field: "intensity",
                }
                .into());
            }
            (DeviceMode::Auto, _, _) => {
                return Err(ValidationError::MissingPayload {
                    mode: "auto",
                    field: "program",
                }
                .into());
            }
        };
        let preset = Self {
            name: name.into(),
            target,
        };
        preset.validate()?;
        Ok(preset)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Icv6Error::Validation`] for a bad name or payload.
    pub fn validate(&self) -> Result<(), Icv6Error> {
        validate_name(&self.name)?;
        self.target.validate()
    }
}

/// Check a preset name: non-blank and at most [`MAX_NAME_LEN`] characters.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] or [`ValidationError::NameTooLong`].
pub fn validate_name(name: &str) -> Result<(), Icv6Error> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong(len).into());
    }
    Ok(())
}
