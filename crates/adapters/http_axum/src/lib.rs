//! # icv6-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small **JSON API** for operators and scripts
//!   (`/api/state`, `/api/program`, `/api/reconciliation/*`, …)
//! - Serve liveness (`/health`) and dependency (`/healthz`) checks
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map [`Icv6Error`](icv6_domain::error::Icv6Error) into status codes
//!
//! ## Dependency rule
//! Depends on `icv6-app` (for port traits and services) and `icv6-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
