//! WebAssembly Bridge Implementations
//!
//! Browser implementations of the traits defined in `bridge-traits`, built
//! on `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It compiles to an empty crate elsewhere.
//!
//! # Implementations
//!
//! - `WebHostEvents`: `window` event listeners plus `document.visibilityState`
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::detect_host_events;
//!
//! let host = detect_host_events();
//! // inject `host` into core_runtime::config::ListenerConfig
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod error;
pub mod host_events;

// Re-export commonly used types
pub use bootstrap::detect_host_events;
pub use error::{WasmError, WasmResult};
pub use host_events::WebHostEvents;
