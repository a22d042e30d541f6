//! Controller port: request/response operations against the lighting device.
//!
//! Every call is one independent exchange with the device. Implementations
//! must not retry internally; callers decide whether to try again.

use std::future::Future;

use icv6_domain::error::Icv6Error;
use icv6_domain::lighting::{DeviceMode, Intensity, Program};

/// The lighting controller as seen by the application core.
pub trait LightingController {
    /// Read the current operating mode.
    fn query_mode(&self) -> impl Future<Output = Result<DeviceMode, Icv6Error>> + Send;

    /// Switch the operating mode.
    fn set_mode(&self, mode: DeviceMode) -> impl Future<Output = Result<(), Icv6Error>> + Send;

    /// Read the manual-mode intensity.
    fn query_intensity(&self) -> impl Future<Output = Result<Intensity, Icv6Error>> + Send;

    /// Apply a manual-mode intensity.
    fn set_intensity(
        &self,
        intensity: Intensity,
    ) -> impl Future<Output = Result<(), Icv6Error>> + Send;

    /// Apply an intensity for live preview only.
    fn set_preview_intensity(
        &self,
        intensity: Intensity,
    ) -> impl Future<Output = Result<(), Icv6Error>> + Send;

    /// Read the stored program.
    fn query_program(&self) -> impl Future<Output = Result<Program, Icv6Error>> + Send;

    /// Upload a program, returning the device's acknowledgement byte.
    fn set_program(&self, program: &Program)
    -> impl Future<Output = Result<u8, Icv6Error>> + Send;
}
