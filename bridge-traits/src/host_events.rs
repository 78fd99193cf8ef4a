//! Host Lifecycle Event Abstraction
//!
//! Provides registration of named lifecycle listeners (visibility, focus,
//! connectivity) and a query for the current visibility status.

use std::fmt;
use std::str::FromStr;

use crate::{
    error::{BridgeError, Result},
    platform::{PlatformSendSync, SharedCallback},
};

/// Lifecycle events a host can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    /// Page or window visibility changed
    VisibilityChange,
    /// Window gained focus
    Focus,
    /// Network connectivity became available
    Online,
    /// Network connectivity was lost
    Offline,
}

impl HostEventKind {
    /// All event kinds, in registration order.
    pub const ALL: [HostEventKind; 4] = [
        HostEventKind::VisibilityChange,
        HostEventKind::Focus,
        HostEventKind::Online,
        HostEventKind::Offline,
    ];

    /// Event name as understood by the host (DOM event type on the web).
    pub fn as_str(&self) -> &'static str {
        match self {
            HostEventKind::VisibilityChange => "visibilitychange",
            HostEventKind::Focus => "focus",
            HostEventKind::Online => "online",
            HostEventKind::Offline => "offline",
        }
    }

    /// Whether the event belongs to the focus group.
    pub fn is_focus_related(&self) -> bool {
        matches!(
            self,
            HostEventKind::VisibilityChange | HostEventKind::Focus
        )
    }

    /// Whether the event belongs to the connectivity group.
    pub fn is_connectivity_related(&self) -> bool {
        matches!(self, HostEventKind::Online | HostEventKind::Offline)
    }
}

impl fmt::Display for HostEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostEventKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        HostEventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BridgeError::NotAvailable(format!("unknown host event '{}'", s)))
    }
}

/// Visibility of the hosting page or window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    /// Content is at least partially visible
    Visible,
    /// Content is hidden (background tab, minimized window)
    Hidden,
}

impl VisibilityState {
    pub fn is_visible(&self) -> bool {
        matches!(self, VisibilityState::Visible)
    }
}

/// Opaque identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Callback invoked when a host event fires.
pub type HostEventHandler = SharedCallback;

/// Host event target trait
///
/// Lets the core attach lifecycle listeners without probing ambient globals.
/// Environments that cannot deliver these events inject [`NullHostEvents`].
///
/// # Platform Support
///
/// - **Web**: `window.addEventListener` + `document.visibilityState`
/// - **Desktop**: Events raised by the native shell (window focus, minimize)
///   and a connectivity watcher
/// - **Mobile**: Activity/scene lifecycle callbacks, reachability
///
/// # Contract
///
/// - Handlers are invoked synchronously on the host's delivery thread.
/// - Removing a listener that is not registered is a no-op, not an error.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::host_events::{HostEventKind, HostEventTarget};
/// use bridge_traits::platform::shared_callback;
///
/// fn watch_online(target: &dyn HostEventTarget) -> Result<ListenerId> {
///     target.add_listener(HostEventKind::Online, shared_callback(|| println!("back online")))
/// }
/// ```
pub trait HostEventTarget: PlatformSendSync {
    /// Whether the host can register listeners at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Register `handler` for `kind`.
    fn add_listener(&self, kind: HostEventKind, handler: HostEventHandler) -> Result<ListenerId>;

    /// Remove a previously registered listener.
    fn remove_listener(&self, kind: HostEventKind, id: ListenerId) -> Result<()>;

    /// Current visibility of the hosting page or window.
    fn visibility_state(&self) -> VisibilityState;
}

/// Host target for environments without lifecycle events.
///
/// Reports itself unavailable; registration hands back a placeholder id and
/// removal does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHostEvents;

impl HostEventTarget for NullHostEvents {
    fn is_available(&self) -> bool {
        false
    }

    fn add_listener(&self, _kind: HostEventKind, _handler: HostEventHandler) -> Result<ListenerId> {
        Ok(ListenerId(0))
    }

    fn remove_listener(&self, _kind: HostEventKind, _id: ListenerId) -> Result<()> {
        Ok(())
    }

    fn visibility_state(&self) -> VisibilityState {
        VisibilityState::Visible
    }
}
