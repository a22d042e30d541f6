//! # icv6-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `LightingController`: request/response operations against the device
//!   - `ActiveTargetRepository`: read & replace the stored intent
//!   - `ReconciliationLog`: append & query reconciliation outcomes
//!   - `PollingConfigRepository`: read & write the loop's polling settings
//!   - `PresetRepository`: CRUD for named presets
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DeviceService`: interactive reads and writes against the device
//!   - `ReconciliationService`: on-demand checks, run history, polling config
//!   - `PresetService`: preset management and one-step apply
//!   - `ReconciliationEngine`: the cancellable background loop
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `icv6-domain` only (plus `tokio` for tasks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod engine;
pub mod ports;
pub mod reconciler;
pub mod services;

#[cfg(test)]
mod fakes;
