//! Browser implementation of [`HostEventTarget`].
//!
//! Listeners are attached to `window`. Each handler is wrapped in a
//! `Closure` that stays owned by the registry until the listener is removed;
//! dropping it earlier would invalidate the JS callback.

use crate::error::{WasmError, WasmResult};
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    host_events::{HostEventHandler, HostEventKind, HostEventTarget, ListenerId, VisibilityState},
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tracing::trace;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::Window;

struct Registration {
    kind: HostEventKind,
    closure: Closure<dyn Fn()>,
}

/// Lifecycle event target backed by the browser `window`.
pub struct WebHostEvents {
    window: Window,
    listeners: RefCell<HashMap<ListenerId, Registration>>,
    next_id: Cell<u64>,
}

impl WebHostEvents {
    /// Wrap the global `window`, or `None` outside a browser window context.
    pub fn from_window() -> Option<Self> {
        web_sys::window().map(Self::new)
    }

    /// Like [`Self::from_window`] but reports the missing window as an error.
    pub fn try_from_window() -> WasmResult<Self> {
        Self::from_window().ok_or(WasmError::NoWindow)
    }

    /// Wrap an explicit `window`.
    pub fn new(window: Window) -> Self {
        Self {
            window,
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    /// Number of listeners currently attached through this target.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl HostEventTarget for WebHostEvents {
    fn add_listener(&self, kind: HostEventKind, handler: HostEventHandler) -> BridgeResult<ListenerId> {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn Fn()>);

        self.window
            .add_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())
            .map_err(|err| BridgeError::Registration {
                event: kind.to_string(),
                message: WasmError::from(err).to_string(),
            })?;

        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .insert(id, Registration { kind, closure });

        trace!(event = %kind, id = id.0, "window listener added");
        Ok(id)
    }

    fn remove_listener(&self, kind: HostEventKind, id: ListenerId) -> BridgeResult<()> {
        let registration = {
            let mut listeners = self.listeners.borrow_mut();
            match listeners.get(&id) {
                Some(existing) if existing.kind == kind => listeners.remove(&id),
                _ => None,
            }
        };

        let Some(registration) = registration else {
            return Ok(());
        };

        self.window
            .remove_event_listener_with_callback(
                registration.kind.as_str(),
                registration.closure.as_ref().unchecked_ref(),
            )
            .map_err(|err| BridgeError::from(WasmError::from(err)))
    }

    fn visibility_state(&self) -> VisibilityState {
        match self.window.document().map(|doc| doc.visibility_state()) {
            Some(web_sys::VisibilityState::Visible) => VisibilityState::Visible,
            _ => VisibilityState::Hidden,
        }
    }
}

impl Drop for WebHostEvents {
    fn drop(&mut self) {
        for (_, registration) in self.listeners.get_mut().drain() {
            let _ = self.window.remove_event_listener_with_callback(
                registration.kind.as_str(),
                registration.closure.as_ref().unchecked_ref(),
            );
        }
    }
}
