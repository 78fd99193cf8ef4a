//! Workspace facade crate.
//!
//! Exposes the feature flags that map to the individual workspace crates so
//! host applications can depend on `lifecycle-bridge-workspace` and pick
//! `desktop-shims` or `wasm` without wiring `core-runtime` themselves.

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_runtime::{
    events::{Dispatch, EventBus, LifecycleAction, LifecycleActions, LifecycleStatus},
    listeners::{
        setup_listeners, CustomBridge, DefaultBridge, ListenerHandle, ListenerManager,
        ListenerRuntime, ListenerStrategy,
    },
    Error, Result,
};
