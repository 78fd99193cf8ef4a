//! # Listener Bridge
//!
//! Wires a store's [`Dispatch`] to host lifecycle events so caching layers
//! can decide when to revalidate (refetch on focus, refetch on reconnect).
//!
//! ## Overview
//!
//! - [`ListenerManager`] owns the subscription state. It attaches at most
//!   one set of host listeners at a time; it replaces a process-wide
//!   "already initialized" flag and is owned by the composition root.
//! - [`ListenerStrategy`] selects how notifications are wired:
//!   [`DefaultBridge`] attaches host listeners through a manager,
//!   [`CustomBridge`] hands dispatch and the notification constructors to a
//!   caller-supplied closure and returns whatever it returns.
//! - [`setup_listeners`] is the single entry point.
//!
//! ## Event mapping
//!
//! | Host event          | Notification                                  |
//! |---------------------|-----------------------------------------------|
//! | `visibilitychange`  | `Focused` if visible, otherwise `Unfocused`   |
//! | `focus`             | `Focused`                                     |
//! | `online`            | `Online`                                      |
//! | `offline`           | `Offline`                                     |
//!
//! ## Usage
//!
//! ```rust
//! use bridge_traits::{HostEventTarget, NullHostEvents};
//! use core_runtime::events::{dispatch_fn, LifecycleAction};
//! use core_runtime::listeners::{setup_listeners, DefaultBridge, ListenerManager};
//! use std::sync::Arc;
//!
//! let host: Arc<dyn HostEventTarget> = Arc::new(NullHostEvents);
//! let manager = Arc::new(ListenerManager::new(host));
//!
//! let dispatch = dispatch_fn(|action: LifecycleAction| println!("{action}"));
//! let handle = setup_listeners(dispatch, &DefaultBridge::new(Arc::clone(&manager)));
//!
//! // No window to listen on: nothing attached, unsubscribe is harmless.
//! assert!(!handle.did_attach());
//! handle.unsubscribe();
//! ```
//!
//! ## Detach semantics
//!
//! Every handle produced by a manager tears down that manager's listeners,
//! including listeners attached by an earlier call. There is one bridge per
//! manager, not one per caller.

use crate::config::ListenerConfig;
use crate::events::{Dispatch, EventBus, LifecycleAction, LifecycleActions, Receiver};
use bridge_traits::{
    host_events::{HostEventHandler, HostEventKind, HostEventTarget, ListenerId, NullHostEvents},
    platform::{shared_callback, SharedCallback},
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, debug_span, trace, warn};

/// Detach callback conventionally returned by custom strategies.
pub type Unsubscribe = SharedCallback;

type Registrations = Vec<(HostEventKind, ListenerId)>;

/// Attachment lifecycle. Host calls happen outside the lock, so a
/// registration in flight is tracked as `Attaching`.
/// `Attaching` carries the ticket of the call doing the work.
enum AttachState {
    Inactive,
    Attaching(u64),
    Active(Registrations),
}

/// Owner of the "listeners attached" state for one host target.
pub struct ListenerManager {
    host: Arc<dyn HostEventTarget>,
    events: Vec<HostEventKind>,
    state: Mutex<AttachState>,
    next_ticket: AtomicU64,
}

impl ListenerManager {
    /// Manager registering all four lifecycle events on `host`.
    pub fn new(host: Arc<dyn HostEventTarget>) -> Self {
        Self::with_events(host, HostEventKind::ALL)
    }

    /// Manager registering only `events` (duplicates ignored).
    pub fn with_events(
        host: Arc<dyn HostEventTarget>,
        events: impl IntoIterator<Item = HostEventKind>,
    ) -> Self {
        let mut selected = Vec::new();
        for kind in events {
            if !selected.contains(&kind) {
                selected.push(kind);
            }
        }

        Self {
            host,
            events: selected,
            state: Mutex::new(AttachState::Inactive),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Manager for an environment without lifecycle events.
    pub fn unavailable() -> Self {
        Self::new(Arc::new(NullHostEvents))
    }

    pub fn from_config(config: &ListenerConfig) -> Self {
        Self::with_events(Arc::clone(&config.host_events), config.events())
    }

    pub fn host(&self) -> &Arc<dyn HostEventTarget> {
        &self.host
    }

    /// Event kinds this manager registers when attaching.
    pub fn events(&self) -> &[HostEventKind] {
        &self.events
    }

    /// Whether host listeners are currently attached.
    pub fn is_active(&self) -> bool {
        matches!(*self.state(), AttachState::Active(_))
    }

    /// Convenience for `setup_listeners(dispatch, &DefaultBridge::new(..))`.
    pub fn setup(self: &Arc<Self>, dispatch: Dispatch) -> ListenerHandle {
        setup_listeners(dispatch, &DefaultBridge::new(Arc::clone(self)))
    }

    fn state(&self) -> MutexGuard<'_, AttachState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach host listeners that forward to `dispatch`.
    ///
    /// Skipped when already active or attaching, or when the host is
    /// unavailable. A failed registration rolls back the listeners added so
    /// far. Returns whether this call attached.
    ///
    /// The host is called without the manager lock held, so a handler fired
    /// during registration may call back into the manager. A
    /// [`detach_all`](Self::detach_all) that lands mid-attach wins: the new
    /// registrations are removed again and this returns `false`.
    pub fn attach(&self, dispatch: Dispatch, actions: LifecycleActions) -> bool {
        let _span = debug_span!("listeners.attach").entered();

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        {
            let mut state = self.state();
            if !matches!(*state, AttachState::Inactive) {
                debug!("Lifecycle listeners already attached; skipping");
                return false;
            }
            if !self.host.is_available() {
                debug!("Host cannot deliver lifecycle events; skipping");
                return false;
            }
            *state = AttachState::Attaching(ticket);
        }

        let mut registrations = Vec::with_capacity(self.events.len());
        for &kind in &self.events {
            let handler = self.handler_for(kind, &dispatch, actions);
            match self.host.add_listener(kind, handler) {
                Ok(id) => registrations.push((kind, id)),
                Err(err) => {
                    warn!(event = %kind, error = %err, "Failed to attach lifecycle listener; rolling back");
                    self.remove_registrations(&registrations);
                    let mut state = self.state();
                    if matches!(*state, AttachState::Attaching(current) if current == ticket) {
                        *state = AttachState::Inactive;
                    }
                    return false;
                }
            }
        }

        let count = registrations.len();
        let detached = {
            let mut state = self.state();
            if matches!(*state, AttachState::Attaching(current) if current == ticket) {
                *state = AttachState::Active(registrations);
                None
            } else {
                Some(registrations)
            }
        };

        if let Some(registrations) = detached {
            debug!("Detached while attaching; removing new listeners");
            self.remove_registrations(&registrations);
            return false;
        }

        debug!(listeners = count, "Lifecycle listeners attached");
        true
    }

    /// Remove every listener this manager attached and mark it inactive.
    ///
    /// Idempotent. Returns the number of listeners removed. An attach in
    /// progress is cancelled and cleans up after itself.
    pub fn detach_all(&self) -> usize {
        let previous = std::mem::replace(&mut *self.state(), AttachState::Inactive);
        let registrations = match previous {
            AttachState::Active(registrations) => registrations,
            AttachState::Attaching(_) => {
                debug!("Cancelling lifecycle listener attach in progress");
                return 0;
            }
            AttachState::Inactive => {
                trace!("No lifecycle listeners to detach");
                return 0;
            }
        };

        self.remove_registrations(&registrations);
        debug!(listeners = registrations.len(), "Lifecycle listeners detached");
        registrations.len()
    }

    fn remove_registrations(&self, registrations: &[(HostEventKind, ListenerId)]) {
        for &(kind, id) in registrations {
            if let Err(err) = self.host.remove_listener(kind, id) {
                warn!(event = %kind, error = %err, "Failed to remove lifecycle listener");
            }
        }
    }

    fn handler_for(
        &self,
        kind: HostEventKind,
        dispatch: &Dispatch,
        actions: LifecycleActions,
    ) -> HostEventHandler {
        let dispatch = Arc::clone(dispatch);
        let forward = move |action: LifecycleAction| {
            trace!(action = %action, "Dispatching lifecycle notification");
            dispatch(action);
        };

        match kind {
            HostEventKind::Focus => shared_callback(move || forward((actions.on_focus)())),
            HostEventKind::Online => shared_callback(move || forward((actions.on_online)())),
            HostEventKind::Offline => shared_callback(move || forward((actions.on_offline)())),
            HostEventKind::VisibilityChange => {
                let host = Arc::downgrade(&self.host);
                shared_callback(move || {
                    let visible = host
                        .upgrade()
                        .map_or(false, |host| host.visibility_state().is_visible());
                    if visible {
                        forward((actions.on_focus)());
                    } else {
                        forward((actions.on_focus_lost)());
                    }
                })
            }
        }
    }
}

impl fmt::Debug for ListenerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerManager")
            .field("events", &self.events)
            .field("host_available", &self.host.is_available())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Detach handle returned by [`DefaultBridge`].
///
/// Dropping the handle leaves listeners attached; call
/// [`unsubscribe`](Self::unsubscribe) to remove them.
#[derive(Clone)]
pub struct ListenerHandle {
    manager: Arc<ListenerManager>,
    attached: bool,
}

impl ListenerHandle {
    /// Remove the manager's listeners. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        self.manager.detach_all();
    }

    /// Whether the call that produced this handle attached the listeners.
    pub fn did_attach(&self) -> bool {
        self.attached
    }

    pub fn manager(&self) -> &Arc<ListenerManager> {
        &self.manager
    }

    /// Turn the handle into a bare detach callback.
    pub fn into_unsubscribe(self) -> Unsubscribe {
        let manager = self.manager;
        shared_callback(move || {
            manager.detach_all();
        })
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("attached", &self.attached)
            .field("active", &self.manager.is_active())
            .finish()
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// How notifications get wired to the host.
pub trait ListenerStrategy {
    /// Value handed back to the caller of [`setup_listeners`].
    type Output;

    fn install(&self, dispatch: Dispatch, actions: LifecycleActions) -> Self::Output;
}

/// Attaches host listeners through a [`ListenerManager`].
#[derive(Debug, Clone)]
pub struct DefaultBridge {
    manager: Arc<ListenerManager>,
}

impl DefaultBridge {
    pub fn new(manager: Arc<ListenerManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<ListenerManager> {
        &self.manager
    }
}

impl ListenerStrategy for DefaultBridge {
    type Output = ListenerHandle;

    fn install(&self, dispatch: Dispatch, actions: LifecycleActions) -> ListenerHandle {
        let attached = self.manager.attach(dispatch, actions);
        ListenerHandle {
            manager: Arc::clone(&self.manager),
            attached,
        }
    }
}

/// Delegates wiring entirely to a caller-supplied closure.
///
/// The bridge registers nothing itself; the closure's return value is
/// returned unchanged.
pub struct CustomBridge<F> {
    handler: F,
}

impl<F> CustomBridge<F> {
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F, R> ListenerStrategy for CustomBridge<F>
where
    F: Fn(Dispatch, LifecycleActions) -> R,
{
    type Output = R;

    fn install(&self, dispatch: Dispatch, actions: LifecycleActions) -> R {
        (self.handler)(dispatch, actions)
    }
}

impl<F> fmt::Debug for CustomBridge<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomBridge").finish_non_exhaustive()
    }
}

/// Wire `dispatch` to lifecycle events using `strategy`.
pub fn setup_listeners<S>(dispatch: Dispatch, strategy: &S) -> S::Output
where
    S: ListenerStrategy + ?Sized,
{
    strategy.install(dispatch, LifecycleActions::STANDARD)
}

// ============================================================================
// Runtime
// ============================================================================

/// Composition-root helper pairing a manager with an [`EventBus`].
#[derive(Debug, Clone)]
pub struct ListenerRuntime {
    bus: Arc<EventBus>,
    manager: Arc<ListenerManager>,
}

impl ListenerRuntime {
    pub fn new(config: &ListenerConfig) -> Self {
        Self {
            bus: Arc::new(EventBus::new(config.event_buffer_size)),
            manager: Arc::new(ListenerManager::from_config(config)),
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn manager(&self) -> &Arc<ListenerManager> {
        &self.manager
    }

    pub fn subscribe(&self) -> Receiver<LifecycleAction> {
        self.bus.subscribe()
    }

    /// Attach listeners that publish into the bus.
    pub fn start(&self) -> ListenerHandle {
        self.manager.setup(self.bus.dispatcher())
    }

    /// Detach listeners. Same effect as any handle's `unsubscribe`.
    pub fn stop(&self) {
        self.manager.detach_all();
    }
}
