//! # Desktop Bridge Implementations
//!
//! Default implementations of the host bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `DesktopHostEvents` - lifecycle event target fed by the native shell
//! - `ConnectivityWatcher` - polls reachability and raises `online`/`offline`
//!
//! ## Feature Flags
//!
//! - `connectivity`: Enable the polling connectivity watcher (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ConnectivityWatcher, DesktopHostEvents};
//! use bridge_traits::{HostEventKind, VisibilityState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let host = Arc::new(DesktopHostEvents::new());
//!     let watcher = ConnectivityWatcher::new().spawn(Arc::clone(&host));
//!
//!     // From the windowing event loop:
//!     host.emit(HostEventKind::Focus);
//!     host.set_visibility(VisibilityState::Hidden);
//!
//!     watcher.shutdown().await;
//! }
//! ```

mod host_events;

#[cfg(feature = "connectivity")]
mod connectivity;

pub use host_events::DesktopHostEvents;

#[cfg(feature = "connectivity")]
pub use connectivity::{
    ConnectivityProbe, ConnectivityWatcher, ProbeFuture, WatcherHandle, DEFAULT_POLL_INTERVAL,
    DEFAULT_PROBE_ADDR, DEFAULT_PROBE_TIMEOUT,
};
