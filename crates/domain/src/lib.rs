//! # icv6-domain
//!
//! Pure domain model for the ICV6 lighting bridge.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Define **lighting values** (four-channel intensities, scheduled programs)
//! - Define the **active target** (the last configuration an operator asked for)
//!   and named **presets** wrapping reusable targets
//! - Define **reconciliation** results (skip / ok / mismatch / error) and the
//!   polling configuration that drives the background loop
//! - Contain all invariant enforcement
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod lighting;
pub mod preset;
pub mod reconciliation;
pub mod target;
