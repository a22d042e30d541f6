//! # icv6-adapter-wire-tcp
//!
//! Wire adapter for the ICV6 lighting controller.
//!
//! ## How it works
//!
//! The controller speaks a length-prefixed, checksummed binary dialect over a
//! raw TCP stream. Every request opens a fresh connection, writes one frame,
//! and scans the inbound stream until the matching reply shows up. The stream
//! may carry keep-alives, stale replies and noise; all of those are skipped.
//!
//! | Layer | Module | IO |
//! |-------|--------|----|
//! | Frame encode/decode | [`codec`] | none |
//! | Stream resynchronisation | [`scanner`] | none |
//! | Command payloads | [`payload`] | none |
//! | Request/response over TCP | `transport` | tokio |
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `icv6-app` and `icv6-domain`.

pub mod codec;
mod config;
mod error;
pub mod payload;
pub mod scanner;
mod transport;

pub use codec::{DeviceSerial, Frame};
pub use config::WireConfig;
pub use error::{FrameError, PayloadError, WireError};
pub use transport::{TcpController, read_expected};
