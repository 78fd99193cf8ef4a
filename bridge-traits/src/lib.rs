//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host platform implements.
//!
//! ## Overview
//!
//! This crate defines the contract between the lifecycle core and the
//! platform-specific adapters. The core never probes ambient globals such as
//! `window`; it is handed a [`HostEventTarget`](host_events::HostEventTarget)
//! at construction time instead.
//!
//! ## Traits
//!
//! - [`HostEventTarget`](host_events::HostEventTarget) - Register lifecycle
//!   listeners (visibility, focus, online, offline) and read visibility
//! - [`LoggerSink`](log_sink::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Target |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | `DesktopHostEvents` |
//! | Web      | `bridge-wasm`       | `WebHostEvents` |
//! | Headless | this crate          | `NullHostEvents` |
//!
//! ## Missing Capabilities
//!
//! Environments without lifecycle events inject
//! [`NullHostEvents`](host_events::NullHostEvents). The core treats it as an
//! unavailable host and silently skips listener registration.
//!
//! ## Thread Safety
//!
//! Traits require `Send + Sync` on native targets. On `wasm32` the bounds are
//! dropped through [`platform::PlatformSendSync`] because browser objects are
//! single-threaded.

pub mod error;
pub mod host_events;
pub mod log_sink;
pub mod platform;

pub use error::BridgeError;

// Re-export commonly used types
pub use host_events::{
    HostEventHandler, HostEventKind, HostEventTarget, ListenerId, NullHostEvents, VisibilityState,
};
pub use log_sink::{LogEntry, LogLevel, LoggerSink};
pub use platform::{shared_callback, SharedCallback};
