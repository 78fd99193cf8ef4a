//! # Core Runtime
//!
//! Lifecycle listener bridge: turns host focus, visibility and connectivity
//! events into `__rtkq/*` notifications delivered through a caller-supplied
//! dispatch function.
//!
//! - [`events`]: notifications, action creators, the broadcast [`events::EventBus`]
//! - [`listeners`]: attach/detach of host listeners and the setup strategies
//! - [`config`]: builder-based configuration with host injection
//! - [`logging`]: `tracing` subscriber setup
//!
//! ## Quick start
//!
//! ```rust
//! use bridge_traits::NullHostEvents;
//! use core_runtime::events::dispatch_fn;
//! use core_runtime::listeners::ListenerManager;
//! use std::sync::Arc;
//!
//! let manager = Arc::new(ListenerManager::new(Arc::new(NullHostEvents)));
//! let handle = manager.setup(dispatch_fn(|action| println!("{action}")));
//!
//! // No host events in this environment, so nothing was registered.
//! assert!(!handle.did_attach());
//! handle.unsubscribe();
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod listeners;
pub mod logging;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use error::{Error, Result};
pub use events::{
    dispatch_fn, on_focus, on_focus_lost, on_offline, on_online, Dispatch, LifecycleAction,
    LifecycleActions,
};
pub use listeners::{
    setup_listeners, CustomBridge, DefaultBridge, ListenerHandle, ListenerManager,
    ListenerStrategy,
};
