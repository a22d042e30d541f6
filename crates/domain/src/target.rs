//! Active target: the configuration an operator last asked the device to run.

use serde::{Deserialize, Serialize};

use crate::error::Icv6Error;
use crate::lighting::{DeviceMode, Intensity, Program};

/// Last intended device configuration.
///
/// Exactly one of intensity or program is meaningful for a given mode, so the
/// two live in separate variants rather than as two nullable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ActiveTarget {
    Manual { intensity: Intensity },
    Auto { program: Program },
}

impl ActiveTarget {
    #[must_use]
    pub fn mode(&self) -> DeviceMode {
        match self {
            Self::Manual { .. } => DeviceMode::Manual,
            Self::Auto { .. } => DeviceMode::Auto,
        }
    }

    /// The intended program, if this target drives the device in auto mode.
    #[must_use]
    pub fn program(&self) -> Option<&Program> {
        match self {
            Self::Auto { program } => Some(program),
            Self::Manual { .. } => None,
        }
    }

    /// Check the wrapped value.
    ///
    /// # Errors
    ///
    /// Propagates the [`Intensity`] or [`Program`] validation failure.
    pub fn validate(&self) -> Result<(), Icv6Error> {
        match self {
            Self::Manual { intensity } => intensity.validate(),
            Self::Auto { program } => program.validate(),
        }
    }
}
