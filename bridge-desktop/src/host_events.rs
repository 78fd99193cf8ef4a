//! Desktop Host Event Target
//!
//! Native windows have no DOM, so the shell (winit, tao, GTK, ...) forwards
//! its own focus and minimize notifications here and the registry fans them
//! out to whatever the core registered.

use bridge_traits::{
    error::Result,
    host_events::{HostEventHandler, HostEventKind, HostEventTarget, ListenerId, VisibilityState},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

type Registry = HashMap<HostEventKind, Vec<(ListenerId, HostEventHandler)>>;

/// In-process event target driven by the native shell.
pub struct DesktopHostEvents {
    listeners: Mutex<Registry>,
    visibility: Mutex<VisibilityState>,
    next_id: AtomicU64,
}

impl DesktopHostEvents {
    /// Create a target that starts out visible.
    pub fn new() -> Self {
        Self::with_visibility(VisibilityState::Visible)
    }

    pub fn with_visibility(visibility: VisibilityState) -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            visibility: Mutex::new(visibility),
            next_id: AtomicU64::new(1),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver `kind` to every registered handler.
    ///
    /// Handlers run after the registry lock is released, so a handler may add
    /// or remove listeners. A listener removed before its turn, from a
    /// handler or another thread, is skipped. Listeners added during the
    /// emit are not called until the next one. Returns the number of handlers
    /// invoked.
    pub fn emit(&self, kind: HostEventKind) -> usize {
        let snapshot: Vec<(ListenerId, HostEventHandler)> = self
            .registry()
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        trace!(event = %kind, handlers = snapshot.len(), "Emitting host event");

        let mut invoked = 0;
        for (id, handler) in &snapshot {
            if !self.is_registered(kind, *id) {
                continue;
            }
            handler();
            invoked += 1;
        }
        invoked
    }

    fn is_registered(&self, kind: HostEventKind, id: ListenerId) -> bool {
        self.registry()
            .get(&kind)
            .map_or(false, |entries| entries.iter().any(|(existing, _)| *existing == id))
    }

    /// Update the window visibility.
    ///
    /// Emits `visibilitychange` only when the state actually changes.
    pub fn set_visibility(&self, state: VisibilityState) -> bool {
        let changed = {
            let mut current = self
                .visibility
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let changed = *current != state;
            *current = state;
            changed
        };

        if changed {
            debug!(visibility = ?state, "Window visibility changed");
            self.emit(HostEventKind::VisibilityChange);
        }
        changed
    }

    /// Number of handlers registered for `kind`.
    pub fn listener_count(&self, kind: HostEventKind) -> usize {
        self.registry().get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Number of handlers registered across all kinds.
    pub fn total_listeners(&self) -> usize {
        self.registry().values().map(Vec::len).sum()
    }
}

impl Default for DesktopHostEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEventTarget for DesktopHostEvents {
    fn add_listener(&self, kind: HostEventKind, handler: HostEventHandler) -> Result<ListenerId> {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry().entry(kind).or_default().push((id, handler));
        trace!(event = %kind, id = id.0, "Listener added");
        Ok(id)
    }

    fn remove_listener(&self, kind: HostEventKind, id: ListenerId) -> Result<()> {
        let mut registry = self.registry();
        if let Some(entries) = registry.get_mut(&kind) {
            entries.retain(|(existing, _)| *existing != id);
            if entries.is_empty() {
                registry.remove(&kind);
            }
        }
        Ok(())
    }

    fn visibility_state(&self) -> VisibilityState {
        *self
            .visibility
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DesktopHostEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopHostEvents")
            .field("listeners", &self.total_listeners())
            .field("visibility", &self.visibility_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::platform::shared_callback;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, HostEventHandler) {
        let count = Arc::new(AtomicUsize::new(0));
        let clone = Arc::clone(&count);
        let handler = shared_callback(move || {
            clone.fetch_add(1, Ordering::SeqCst);
        });
        (count, handler)
    }

    #[test]
    fn test_emit_reaches_registered_handlers() {
        let host = DesktopHostEvents::new();
        let (count, handler) = counter();

        host.add_listener(HostEventKind::Online, handler).unwrap();

        assert_eq!(host.emit(HostEventKind::Online), 1);
        assert_eq!(host.emit(HostEventKind::Offline), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_listener() {
        let host = DesktopHostEvents::new();
        let (count, handler) = counter();

        let id = host.add_listener(HostEventKind::Focus, handler).unwrap();
        assert_eq!(host.listener_count(HostEventKind::Focus), 1);

        host.remove_listener(HostEventKind::Focus, id).unwrap();
        assert_eq!(host.listener_count(HostEventKind::Focus), 0);

        host.emit(HostEventKind::Focus);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_unknown_listener_is_noop() {
        let host = DesktopHostEvents::new();
        let (_, handler) = counter();
        host.add_listener(HostEventKind::Focus, handler).unwrap();

        host.remove_listener(HostEventKind::Focus, ListenerId(999))
            .unwrap();
        host.remove_listener(HostEventKind::Offline, ListenerId(1))
            .unwrap();

        assert_eq!(host.total_listeners(), 1);
    }

    #[test]
    fn test_set_visibility_emits_only_on_change() {
        let host = DesktopHostEvents::new();
        let (count, handler) = counter();
        host.add_listener(HostEventKind::VisibilityChange, handler)
            .unwrap();

        assert!(!host.set_visibility(VisibilityState::Visible));
        assert!(host.set_visibility(VisibilityState::Hidden));
        assert!(!host.set_visibility(VisibilityState::Hidden));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(host.visibility_state(), VisibilityState::Hidden);
    }

    #[test]
    fn test_handler_may_reenter_registry() {
        let host = Arc::new(DesktopHostEvents::new());
        let weak = Arc::downgrade(&host);

        host.add_listener(
            HostEventKind::Offline,
            shared_callback(move || {
                if let Some(host) = weak.upgrade() {
                    let _ = host.add_listener(HostEventKind::Online, shared_callback(|| {}));
                }
            }),
        )
        .unwrap();

        host.emit(HostEventKind::Offline);
        assert_eq!(host.listener_count(HostEventKind::Online), 1);
    }

    #[test]
    fn test_listener_removed_mid_emit_is_skipped() {
        let host = Arc::new(DesktopHostEvents::new());
        let (count, handler) = counter();
        let removed = Arc::new(Mutex::new(None::<ListenerId>));

        let weak = Arc::downgrade(&host);
        let target = Arc::clone(&removed);
        host.add_listener(
            HostEventKind::Focus,
            shared_callback(move || {
                let id = *target.lock().unwrap();
                if let (Some(host), Some(id)) = (weak.upgrade(), id) {
                    host.remove_listener(HostEventKind::Focus, id).unwrap();
                }
            }),
        )
        .unwrap();
        let id = host.add_listener(HostEventKind::Focus, handler).unwrap();
        *removed.lock().unwrap() = Some(id);

        assert_eq!(host.emit(HostEventKind::Focus), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(host.listener_count(HostEventKind::Focus), 1);
    }
}
