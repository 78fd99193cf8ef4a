//! # Lifecycle Notifications & Event Bus
//!
//! Defines the four lifecycle notifications the listener bridge emits, the
//! [`Dispatch`] handle they are delivered through, and a broadcast
//! [`EventBus`] that can act as that dispatch target.
//!
//! ## Overview
//!
//! - **Notifications**: [`LifecycleAction`] values identified by a fixed
//!   action type (`__rtkq/focused`, `__rtkq/unfocused`, `__rtkq/online`,
//!   `__rtkq/offline`). They carry no payload.
//! - **Constructors**: [`LifecycleActions`] bundles the four constructor
//!   functions handed to custom listener strategies.
//! - **EventBus**: `tokio::sync::broadcast` channel fanning notifications out
//!   to any number of consumers.
//! - **LifecycleStatus**: fold of notifications into `focused`/`online` flags
//!   for consumers that want current state instead of edges.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  dispatch   ┌───────────┐   subscribe   ┌──────────────┐
//! │ Listener     ├────────────>│ EventBus  ├──────────────>│ Cache layer  │
//! │ Bridge       │             │ (broadcast│               └──────────────┘
//! └──────────────┘             │  channel) │   subscribe   ┌──────────────┐
//!                              │           ├──────────────>│ Status view  │
//!                              └───────────┘               └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, LifecycleAction};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! let dispatch = bus.dispatcher();
//! dispatch(LifecycleAction::Online);
//!
//! assert_eq!(rx.recv().await.unwrap(), LifecycleAction::Online);
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Receivers see `RecvError::Lagged(n)` when they fall more than the buffer
//! size behind and `RecvError::Closed` once the bus is dropped. Lifecycle
//! notifications are edge signals, so a lagging consumer can resynchronise
//! from the latest one it receives.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Namespace shared by every lifecycle action type.
pub const ACTION_NAMESPACE: &str = "__rtkq";

// ============================================================================
// Notifications
// ============================================================================

/// A parameterless lifecycle notification.
///
/// Serialises as a plain action object, `{"type": "__rtkq/focused"}`, so it
/// can be fed straight into a reducer-style store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LifecycleAction {
    /// The page or window regained focus / became visible.
    #[serde(rename = "__rtkq/focused")]
    Focused,
    /// The page or window was hidden.
    #[serde(rename = "__rtkq/unfocused")]
    Unfocused,
    /// Network connectivity came back.
    #[serde(rename = "__rtkq/online")]
    Online,
    /// Network connectivity was lost.
    #[serde(rename = "__rtkq/offline")]
    Offline,
}

impl LifecycleAction {
    pub const ALL: [LifecycleAction; 4] = [
        LifecycleAction::Focused,
        LifecycleAction::Unfocused,
        LifecycleAction::Online,
        LifecycleAction::Offline,
    ];

    /// The fixed identifying name of this notification.
    pub fn action_type(&self) -> &'static str {
        match self {
            LifecycleAction::Focused => "__rtkq/focused",
            LifecycleAction::Unfocused => "__rtkq/unfocused",
            LifecycleAction::Online => "__rtkq/online",
            LifecycleAction::Offline => "__rtkq/offline",
        }
    }

    /// Returns a human-readable description of the notification.
    pub fn description(&self) -> &'static str {
        match self {
            LifecycleAction::Focused => "Application regained focus",
            LifecycleAction::Unfocused => "Application lost focus",
            LifecycleAction::Online => "Network connection restored",
            LifecycleAction::Offline => "Network connection lost",
        }
    }

    /// Whether `action_type` names this notification.
    pub fn matches(&self, action_type: &str) -> bool {
        self.action_type() == action_type
    }

    pub fn is_focus_related(&self) -> bool {
        matches!(self, LifecycleAction::Focused | LifecycleAction::Unfocused)
    }

    pub fn is_connectivity_related(&self) -> bool {
        matches!(self, LifecycleAction::Online | LifecycleAction::Offline)
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_type())
    }
}

impl FromStr for LifecycleAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleAction::ALL
            .into_iter()
            .find(|action| action.matches(s))
            .ok_or_else(|| Error::UnknownAction(s.to_string()))
    }
}

/// Creates [`LifecycleAction::Focused`].
pub fn on_focus() -> LifecycleAction {
    LifecycleAction::Focused
}

/// Creates [`LifecycleAction::Unfocused`].
pub fn on_focus_lost() -> LifecycleAction {
    LifecycleAction::Unfocused
}

/// Creates [`LifecycleAction::Online`].
pub fn on_online() -> LifecycleAction {
    LifecycleAction::Online
}

/// Creates [`LifecycleAction::Offline`].
pub fn on_offline() -> LifecycleAction {
    LifecycleAction::Offline
}

/// The notification constructors handed to custom listener strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleActions {
    pub on_focus: fn() -> LifecycleAction,
    pub on_focus_lost: fn() -> LifecycleAction,
    pub on_online: fn() -> LifecycleAction,
    pub on_offline: fn() -> LifecycleAction,
}

impl LifecycleActions {
    pub const STANDARD: LifecycleActions = LifecycleActions {
        on_focus,
        on_focus_lost,
        on_online,
        on_offline,
    };
}

impl Default for LifecycleActions {
    fn default() -> Self {
        Self::STANDARD
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Shared function that forwards notifications into application state.
#[cfg(not(target_arch = "wasm32"))]
pub type Dispatch = Arc<dyn Fn(LifecycleAction) + Send + Sync>;

/// Shared function that forwards notifications into application state.
#[cfg(target_arch = "wasm32")]
pub type Dispatch = Arc<dyn Fn(LifecycleAction)>;

/// Wraps a closure into a [`Dispatch`].
#[cfg(not(target_arch = "wasm32"))]
pub fn dispatch_fn<F>(dispatch: F) -> Dispatch
where
    F: Fn(LifecycleAction) + Send + Sync + 'static,
{
    Arc::new(dispatch)
}

/// Wraps a closure into a [`Dispatch`].
#[cfg(target_arch = "wasm32")]
pub fn dispatch_fn<F>(dispatch: F) -> Dispatch
where
    F: Fn(LifecycleAction) + 'static,
{
    Arc::new(dispatch)
}

// ============================================================================
// Lifecycle Status
// ============================================================================

/// Current focus and connectivity, derived from notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStatus {
    pub focused: bool,
    pub online: bool,
}

impl Default for LifecycleStatus {
    /// Hosts start out assumed focused and online.
    fn default() -> Self {
        Self {
            focused: true,
            online: true,
        }
    }
}

impl LifecycleStatus {
    /// Fold one notification into the status.
    pub fn apply(&mut self, action: LifecycleAction) {
        match action {
            LifecycleAction::Focused => self.focused = true,
            LifecycleAction::Unfocused => self.focused = false,
            LifecycleAction::Online => self.online = true,
            LifecycleAction::Offline => self.online = false,
        }
    }

    /// Returns the status after `action`, leaving `self` untouched.
    pub fn reduce(mut self, action: LifecycleAction) -> Self {
        self.apply(action);
        self
    }

    /// Whether cached data should be refetched when this notification arrives.
    ///
    /// True for a focus regain or reconnect that changes the status.
    pub fn should_revalidate_on(&self, action: LifecycleAction) -> bool {
        match action {
            LifecycleAction::Focused => !self.focused,
            LifecycleAction::Online => !self.online,
            LifecycleAction::Unfocused | LifecycleAction::Offline => false,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for lifecycle notifications.
///
/// Cloning the bus clones the sender; all clones publish into one channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LifecycleAction>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Returns the number of subscribers that received it, or an error when
    /// nobody is listening.
    pub fn emit(&self, action: LifecycleAction) -> Result<usize, SendError<LifecycleAction>> {
        self.sender.send(action)
    }

    /// Creates a new subscriber. Past notifications are not replayed.
    pub fn subscribe(&self) -> Receiver<LifecycleAction> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// A [`Dispatch`] that publishes into this bus.
    ///
    /// Notifications emitted while nobody is subscribed are dropped.
    pub fn dispatcher(&self) -> Dispatch {
        let sender = self.sender.clone();
        Arc::new(move |action: LifecycleAction| {
            if sender.send(action).is_err() {
                trace!(action = %action, "No subscribers for lifecycle notification");
            }
        })
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type ActionFilter = Box<dyn Fn(&LifecycleAction) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with an optional filter.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let connectivity = EventStream::new(bus.subscribe())
///     .filter(|action| action.is_connectivity_related());
/// ```
pub struct EventStream {
    receiver: Receiver<LifecycleAction>,
    filter: Option<ActionFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<LifecycleAction>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only notifications matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&LifecycleAction) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, action: &LifecycleAction) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(action))
    }

    /// Receives the next notification that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<LifecycleAction, RecvError> {
        loop {
            let action = self.receiver.recv().await?;
            if self.accepts(&action) {
                return Ok(action);
            }
        }
    }

    /// Attempts to receive a notification without waiting.
    ///
    /// Returns `None` if nothing matching is currently queued.
    pub fn try_recv(&mut self) -> Option<Result<LifecycleAction, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(action) => {
                    if self.accepts(&action) {
                        return Some(Ok(action));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_action_types_are_fixed() {
        assert_eq!(LifecycleAction::Focused.action_type(), "__rtkq/focused");
        assert_eq!(LifecycleAction::Unfocused.action_type(), "__rtkq/unfocused");
        assert_eq!(LifecycleAction::Online.action_type(), "__rtkq/online");
        assert_eq!(LifecycleAction::Offline.action_type(), "__rtkq/offline");
        for action in LifecycleAction::ALL {
            assert!(action.action_type().starts_with(ACTION_NAMESPACE));
        }
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(
            "__rtkq/online".parse::<LifecycleAction>().unwrap(),
            LifecycleAction::Online
        );
        let err = "__rtkq/resized".parse::<LifecycleAction>().unwrap_err();
        assert!(matches!(err, Error::UnknownAction(ref name) if name == "__rtkq/resized"));
    }

    #[test]
    fn test_action_serializes_as_action_object() {
        let json = serde_json::to_value(LifecycleAction::Unfocused).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "__rtkq/unfocused" }));

        let parsed: LifecycleAction =
            serde_json::from_str(r#"{"type":"__rtkq/offline"}"#).unwrap();
        assert_eq!(parsed, LifecycleAction::Offline);
    }

    #[test]
    fn test_constructors() {
        let actions = LifecycleActions::default();
        assert_eq!((actions.on_focus)(), LifecycleAction::Focused);
        assert_eq!((actions.on_focus_lost)(), LifecycleAction::Unfocused);
        assert_eq!((actions.on_online)(), LifecycleAction::Online);
        assert_eq!((actions.on_offline)(), LifecycleAction::Offline);
        assert_eq!(actions, LifecycleActions::STANDARD);
    }

    #[test]
    fn test_status_reducer() {
        let status = LifecycleStatus::default()
            .reduce(LifecycleAction::Unfocused)
            .reduce(LifecycleAction::Offline);
        assert_eq!(
            status,
            LifecycleStatus {
                focused: false,
                online: false
            }
        );

        assert!(status.should_revalidate_on(LifecycleAction::Focused));
        assert!(status.should_revalidate_on(LifecycleAction::Online));
        assert!(!status.should_revalidate_on(LifecycleAction::Offline));

        let restored = status.reduce(LifecycleAction::Online);
        assert!(restored.online);
        assert!(!restored.should_revalidate_on(LifecycleAction::Online));
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_errors() {
        let bus = EventBus::new(10);
        assert!(bus.emit(LifecycleAction::Focused).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_action() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.emit(LifecycleAction::Offline).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), LifecycleAction::Offline);
        assert_eq!(sub2.recv().await.unwrap(), LifecycleAction::Offline);
    }

    #[tokio::test]
    async fn test_dispatcher_publishes_and_tolerates_no_subscribers() {
        let bus = EventBus::new(10);
        let dispatch = bus.dispatcher();

        dispatch(LifecycleAction::Focused);

        let mut sub = bus.subscribe();
        dispatch(LifecycleAction::Online);
        assert_eq!(sub.recv().await.unwrap(), LifecycleAction::Online);
    }

    #[tokio::test]
    async fn test_event_stream_filter() {
        let bus = EventBus::new(10);
        let mut stream =
            EventStream::new(bus.subscribe()).filter(|action| action.is_connectivity_related());

        bus.emit(LifecycleAction::Focused).ok();
        bus.emit(LifecycleAction::Unfocused).ok();
        bus.emit(LifecycleAction::Offline).ok();

        assert_eq!(stream.recv().await.unwrap(), LifecycleAction::Offline);
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_event_stream_lagged() {
        let bus = EventBus::new(2);
        let mut stream = EventStream::new(bus.subscribe());

        for action in LifecycleAction::ALL {
            bus.emit(action).ok();
        }

        assert!(matches!(stream.try_recv(), Some(Err(RecvError::Lagged(2)))));
        assert_eq!(
            stream.try_recv().unwrap().unwrap(),
            LifecycleAction::Online
        );
    }

    #[tokio::test]
    async fn test_event_stream_closed() {
        let bus = EventBus::new(4);
        let mut stream = EventStream::new(bus.subscribe());
        drop(bus);

        assert!(matches!(stream.recv().await, Err(RecvError::Closed)));
    }
}
