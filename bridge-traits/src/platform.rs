//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Native targets require `Send + Sync` so host targets and the handlers they
//! store can be shared across threads. WebAssembly builds run on a single
//! thread and cannot satisfy those bounds because browser-provided objects
//! (e.g., `web_sys::Window`, `js_sys::Function`) are not thread-safe. The
//! helpers below make the required bounds conditional without duplicating
//! every trait definition.

use std::sync::Arc;

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}

/// Shared zero-argument callback, thread-safe where the platform allows it.
#[cfg(not(target_arch = "wasm32"))]
pub type SharedCallback = Arc<dyn Fn() + Send + Sync>;

#[cfg(target_arch = "wasm32")]
pub type SharedCallback = Arc<dyn Fn()>;

/// Wraps a closure into a [`SharedCallback`].
#[cfg(not(target_arch = "wasm32"))]
pub fn shared_callback<F>(callback: F) -> SharedCallback
where
    F: Fn() + Send + Sync + 'static,
{
    Arc::new(callback)
}

#[cfg(target_arch = "wasm32")]
pub fn shared_callback<F>(callback: F) -> SharedCallback
where
    F: Fn() + 'static,
{
    Arc::new(callback)
}
