//! Lighting values: intensities, scheduled programs and the device mode.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Icv6Error, ValidationError};

/// Highest level a single channel accepts.
pub const MAX_CHANNEL_LEVEL: u8 = 100;

/// Four channel levels, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intensity {
    pub ch1: u8,
    pub ch2: u8,
    pub ch3: u8,
    pub ch4: u8,
}

impl Intensity {
    /// Build an intensity, checking every channel.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ChannelOutOfRange`] if a level exceeds 100.
    pub fn new(ch1: u8, ch2: u8, ch3: u8, ch4: u8) -> Result<Self, Icv6Error> {
        let intensity = Self { ch1, ch2, ch3, ch4 };
        intensity.validate()?;
        Ok(intensity)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ChannelOutOfRange`] if a level exceeds 100.
    pub fn validate(&self) -> Result<(), Icv6Error> {
        check_channels(&self.channels())
    }

    /// Channel levels in wire order.
    #[must_use]
    pub fn channels(&self) -> [u8; 4] {
        [self.ch1, self.ch2, self.ch3, self.ch4]
    }

    /// Inverse of [`channels`](Self::channels).
    #[must_use]
    pub fn from_channels([ch1, ch2, ch3, ch4]: [u8; 4]) -> Self {
        Self { ch1, ch2, ch3, ch4 }
    }
}

fn check_channels(levels: &[u8; 4]) -> Result<(), Icv6Error> {
    const NAMES: [&str; 4] = ["ch1", "ch2", "ch3", "ch4"];
    for (&channel, &value) in NAMES.iter().zip(levels) {
        if value > MAX_CHANNEL_LEVEL {
            return Err(ValidationError::ChannelOutOfRange { channel, value }.into());
        }
    }
    Ok(())
}

/// One scheduled lighting step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramPoint {
    /// 1-based position in the schedule.
    pub index: u8,
    pub hour: u8,
    pub minute: u8,
    pub ch1: u8,
    pub ch2: u8,
    pub ch3: u8,
    pub ch4: u8,
}

impl ProgramPoint {
    /// Check domain invariants for a single point.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first violated field.
    pub fn validate(&self) -> Result<(), Icv6Error> {
        if self.index == 0 {
            return Err(ValidationError::ZeroIndex.into());
        }
        if self.hour > 23 {
            return Err(ValidationError::HourOutOfRange {
                index: self.index,
                hour: self.hour,
            }
            .into());
        }
        if self.minute > 59 {
            return Err(ValidationError::MinuteOutOfRange {
                index: self.index,
                minute: self.minute,
            }
            .into());
        }
        check_channels(&[self.ch1, self.ch2, self.ch3, self.ch4])
    }
}

/// An ordered set of time-of-day lighting steps.
///
/// In-memory order is whatever the caller supplied; [`canonical`](Self::canonical)
/// yields the wire order (ascending `index`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub points: Vec<ProgramPoint>,
}

impl Program {
    #[must_use]
    pub fn new(points: Vec<ProgramPoint>) -> Self {
        Self { points }
    }

    /// Check every point plus index uniqueness.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for the first invalid point, or
    /// [`ValidationError::DuplicateIndex`] if two points share an index.
    pub fn validate(&self) -> Result<(), Icv6Error> {
        let mut seen = HashSet::with_capacity(self.points.len());
        for point in &self.points {
            point.validate()?;
            if !seen.insert(point.index) {
                return Err(ValidationError::DuplicateIndex(point.index).into());
            }
        }
        Ok(())
    }

    /// Copy of this program with points sorted by ascending `index`.
    #[must_use]
    pub fn canonical(&self) -> Self {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.index);
        Self { points }
    }

    /// Point-for-point equality after canonical ordering.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Operating mode of the lighting controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    /// Driven by a fixed [`Intensity`].
    Manual,
    /// Driven by the stored [`Program`].
    Auto,
}

impl DeviceMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "auto" => Ok(Self::Auto),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// What the device reports right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeviceState {
    Manual { intensity: Intensity },
    Auto { program: Program },
}

impl DeviceState {
    #[must_use]
    pub fn mode(&self) -> DeviceMode {
        match self {
            Self::Manual { .. } => DeviceMode::Manual,
            Self::Auto { .. } => DeviceMode::Auto,
        }
    }
}
