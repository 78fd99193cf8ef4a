//! WASM bindings for core-runtime
//!
//! Exposes the lifecycle listener bridge and logging to JavaScript/TypeScript.
//!
//! ```js
//! import { JsListenerBridge, initLogging, JsLoggingConfig } from "core-runtime";
//!
//! initLogging(new JsLoggingConfig());
//! const bridge = new JsListenerBridge();
//! const handle = bridge.setup((action) => store.dispatch(action));
//! // later
//! handle.unsubscribe();
//! ```

use crate::events::{self, dispatch_fn, LifecycleAction};
use crate::listeners::{ListenerHandle, ListenerManager};
use crate::logging::{init_logging, LogFormat, LoggingConfig};
use bridge_traits::{HostEventKind, LogLevel};
use std::sync::Arc;
use tracing::warn;
use wasm_bindgen::prelude::*;

fn to_js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn action_to_js(action: LifecycleAction) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&action).map_err(to_js_error)
}

// =============================================================================
// Logging
// =============================================================================

/// JavaScript-accessible logging configuration
#[wasm_bindgen]
#[derive(Clone, Default)]
pub struct JsLoggingConfig {
    inner: LoggingConfig,
}

#[wasm_bindgen]
impl JsLoggingConfig {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set log format (0 = Pretty, 1 = Json, 2 = Compact)
    #[wasm_bindgen(js_name = setFormat)]
    pub fn set_format(&mut self, format: u8) {
        self.inner.format = match format {
            1 => LogFormat::Json,
            2 => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };
    }

    /// Set minimum log level (0 = Trace, 1 = Debug, 2 = Info, 3 = Warn, 4 = Error)
    #[wasm_bindgen(js_name = setLevel)]
    pub fn set_level(&mut self, level: u8) {
        self.inner.level = match level {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Info,
        };
    }

    /// Set custom filter string (e.g., "core_runtime=debug,bridge_wasm=trace")
    #[wasm_bindgen(js_name = setFilter)]
    pub fn set_filter(&mut self, filter: String) {
        self.inner.filter = Some(filter);
    }
}

/// Initialize logging to the browser console.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging_js(config: JsLoggingConfig) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init_logging(config.inner).map_err(to_js_error)
}

// =============================================================================
// Listener bridge
// =============================================================================

/// Lifecycle listener bridge bound to the current window.
///
/// Without a window (workers, server-side rendering) the bridge is inert and
/// `setup` returns a handle whose `didAttach` is `false`.
#[wasm_bindgen]
pub struct JsListenerBridge {
    manager: Arc<ListenerManager>,
}

#[wasm_bindgen]
impl JsListenerBridge {
    /// Create a bridge listening to every lifecycle event.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            manager: Arc::new(ListenerManager::new(bridge_wasm::detect_host_events())),
        }
    }

    /// Create a bridge restricted to focus and/or connectivity events.
    #[wasm_bindgen(js_name = withEvents)]
    pub fn with_events(listen_focus: bool, listen_connectivity: bool) -> Self {
        let events = HostEventKind::ALL.into_iter().filter(|kind| {
            (listen_focus && kind.is_focus_related())
                || (listen_connectivity && kind.is_connectivity_related())
        });
        Self {
            manager: Arc::new(ListenerManager::with_events(
                bridge_wasm::detect_host_events(),
                events,
            )),
        }
    }

    /// Attach window listeners that call `dispatch` with `{ type }` objects.
    pub fn setup(&self, dispatch: js_sys::Function) -> JsListenerHandle {
        let dispatch = dispatch_fn(move |action: LifecycleAction| {
            let result = action_to_js(action)
                .and_then(|value| dispatch.call1(&JsValue::NULL, &value));
            if let Err(err) = result {
                warn!(action = action.action_type(), error = ?err, "JS dispatch failed");
            }
        });

        JsListenerHandle {
            inner: self.manager.setup(dispatch),
        }
    }

    /// Whether window listeners are currently attached.
    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.manager.is_active()
    }
}

impl Default for JsListenerBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`JsListenerBridge::setup`].
#[wasm_bindgen]
pub struct JsListenerHandle {
    inner: ListenerHandle,
}

#[wasm_bindgen]
impl JsListenerHandle {
    /// Remove the window listeners. Safe to call more than once.
    pub fn unsubscribe(&self) {
        self.inner.unsubscribe();
    }

    /// Whether this setup call registered the listeners.
    #[wasm_bindgen(getter, js_name = didAttach)]
    pub fn did_attach(&self) -> bool {
        self.inner.did_attach()
    }
}

// =============================================================================
// Action creators
// =============================================================================

#[wasm_bindgen(js_name = onFocus)]
pub fn on_focus_js() -> Result<JsValue, JsValue> {
    action_to_js(events::on_focus())
}

#[wasm_bindgen(js_name = onFocusLost)]
pub fn on_focus_lost_js() -> Result<JsValue, JsValue> {
    action_to_js(events::on_focus_lost())
}

#[wasm_bindgen(js_name = onOnline)]
pub fn on_online_js() -> Result<JsValue, JsValue> {
    action_to_js(events::on_online())
}

#[wasm_bindgen(js_name = onOffline)]
pub fn on_offline_js() -> Result<JsValue, JsValue> {
    action_to_js(events::on_offline())
}
