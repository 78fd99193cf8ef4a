//! # Listener Configuration
//!
//! Builder-based configuration for the lifecycle listener bridge.
//!
//! ## Overview
//!
//! [`ListenerConfig`] carries the host event target and the knobs that shape
//! what the bridge registers. The builder validates the result so bad
//! combinations fail at startup instead of silently listening to nothing.
//!
//! ## Host target resolution
//!
//! When no host target is supplied:
//!
//! - with the `desktop-shims` feature a `DesktopHostEvents` target is
//!   injected;
//! - otherwise `require_host(true)` fails the build with
//!   [`Error::CapabilityMissing`];
//! - otherwise `NullHostEvents` is used and the bridge becomes a no-op.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::ListenerConfig;
//!
//! let config = ListenerConfig::builder()
//!     .listen_connectivity(true)
//!     .listen_focus(false)
//!     .event_buffer_size(32)
//!     .build()
//!     .expect("valid listener config");
//!
//! assert_eq!(config.events().len(), 2);
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::ListenerConfig;
//!
//! // Nothing to listen to
//! ListenerConfig::builder()
//!     .listen_focus(false)
//!     .listen_connectivity(false)
//!     .build()
//!     .expect("Should fail - no event groups enabled");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{HostEventKind, HostEventTarget};
use std::sync::Arc;
use tracing::debug;

/// Upper bound for the event bus buffer.
pub const MAX_EVENT_BUFFER_SIZE: usize = 10_000;

/// Configuration for the lifecycle listener bridge.
///
/// Use [`ListenerConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct ListenerConfig {
    /// Host capability used to register listeners
    pub host_events: Arc<dyn HostEventTarget>,

    /// Register `focus` and `visibilitychange`
    pub listen_focus: bool,

    /// Register `online` and `offline`
    pub listen_connectivity: bool,

    /// Buffer size of the notification bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for ListenerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerConfig")
            .field(
                "host_events",
                &format_args!(
                    "HostEventTarget {{ available: {} }}",
                    self.host_events.is_available()
                ),
            )
            .field("listen_focus", &self.listen_focus)
            .field("listen_connectivity", &self.listen_connectivity)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl ListenerConfig {
    pub fn builder() -> ListenerConfigBuilder {
        ListenerConfigBuilder::default()
    }

    /// Host event kinds selected by the focus/connectivity switches.
    pub fn events(&self) -> Vec<HostEventKind> {
        HostEventKind::ALL
            .into_iter()
            .filter(|kind| {
                (self.listen_focus && kind.is_focus_related())
                    || (self.listen_connectivity && kind.is_connectivity_related())
            })
            .collect()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// - Both event groups are disabled
    /// - `event_buffer_size` is 0 or above [`MAX_EVENT_BUFFER_SIZE`]
    pub fn validate(&self) -> Result<()> {
        if !self.listen_focus && !self.listen_connectivity {
            return Err(Error::Config(
                "At least one of listen_focus or listen_connectivity must be enabled".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size must not exceed {} (got {})",
                MAX_EVENT_BUFFER_SIZE, self.event_buffer_size
            )));
        }

        Ok(())
    }
}

fn host_events_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HostEventTarget".to_string(),
        message: "A HostEventTarget is required to receive lifecycle events. \
                 Desktop: enable the 'desktop-shims' feature or inject DesktopHostEvents. \
                 Web: inject bridge_wasm::detect_host_events()."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_host_events(_require_host: bool) -> Result<Arc<dyn HostEventTarget>> {
    use bridge_desktop::DesktopHostEvents;

    let host: Arc<dyn HostEventTarget> = Arc::new(DesktopHostEvents::new());
    Ok(host)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_host_events(require_host: bool) -> Result<Arc<dyn HostEventTarget>> {
    use bridge_traits::NullHostEvents;

    if require_host {
        return Err(host_events_missing_error());
    }
    debug!("No HostEventTarget provided; lifecycle listeners disabled");
    let host: Arc<dyn HostEventTarget> = Arc::new(NullHostEvents);
    Ok(host)
}

/// Builder for [`ListenerConfig`].
#[derive(Default)]
pub struct ListenerConfigBuilder {
    host_events: Option<Arc<dyn HostEventTarget>>,
    require_host: bool,
    listen_focus: Option<bool>,
    listen_connectivity: Option<bool>,
    event_buffer_size: Option<usize>,
}

impl ListenerConfigBuilder {
    /// Inject the host capability.
    pub fn host_events(mut self, host: Arc<dyn HostEventTarget>) -> Self {
        self.host_events = Some(host);
        self
    }

    /// Fail the build when no usable host is available.
    ///
    /// An injected host that reports itself unavailable also fails.
    pub fn require_host(mut self, required: bool) -> Self {
        self.require_host = required;
        self
    }

    /// Register `focus` and `visibilitychange` (default: true).
    pub fn listen_focus(mut self, enabled: bool) -> Self {
        self.listen_focus = Some(enabled);
        self
    }

    /// Register `online` and `offline` (default: true).
    pub fn listen_connectivity(mut self, enabled: bool) -> Self {
        self.listen_connectivity = Some(enabled);
        self
    }

    /// Notification bus buffer size (default: 100).
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when `require_host` is set and no
    ///   available host exists
    /// - [`Error::Config`] when validation fails
    pub fn build(self) -> Result<ListenerConfig> {
        let host_events = match self.host_events {
            Some(host) => host,
            None => provide_default_host_events(self.require_host)?,
        };

        if self.require_host && !host_events.is_available() {
            return Err(host_events_missing_error());
        }

        let config = ListenerConfig {
            host_events,
            listen_focus: self.listen_focus.unwrap_or(true),
            listen_connectivity: self.listen_connectivity.unwrap_or(true),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        debug!(events = ?config.events(), "Listener configuration built");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::NullHostEvents;

    fn null_host() -> Arc<dyn HostEventTarget> {
        Arc::new(NullHostEvents)
    }

    #[test]
    fn test_defaults() {
        let config = ListenerConfig::builder()
            .host_events(null_host())
            .build()
            .unwrap();

        assert!(config.listen_focus);
        assert!(config.listen_connectivity);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.events(), HostEventKind::ALL.to_vec());
    }

    #[test]
    fn test_focus_only() {
        let config = ListenerConfig::builder()
            .host_events(null_host())
            .listen_connectivity(false)
            .build()
            .unwrap();

        assert_eq!(
            config.events(),
            vec![HostEventKind::VisibilityChange, HostEventKind::Focus]
        );
    }

    #[test]
    fn test_rejects_no_event_groups() {
        let result = ListenerConfig::builder()
            .host_events(null_host())
            .listen_focus(false)
            .listen_connectivity(false)
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_zero_buffer() {
        let result = ListenerConfig::builder()
            .host_events(null_host())
            .event_buffer_size(0)
            .build();

        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("greater than 0")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_excessive_buffer() {
        let result = ListenerConfig::builder()
            .host_events(null_host())
            .event_buffer_size(MAX_EVENT_BUFFER_SIZE + 1)
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_require_host_rejects_unavailable_host() {
        let result = ListenerConfig::builder()
            .host_events(null_host())
            .require_host(true)
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "HostEventTarget")
            }
            other => panic!("expected missing capability, got {:?}", other),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_host_falls_back_to_null() {
        let config = ListenerConfig::builder().build().unwrap();
        assert!(!config.host_events.is_available());

        let result = ListenerConfig::builder().require_host(true).build();
        assert!(matches!(result, Err(Error::CapabilityMissing { .. })));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_missing_host_uses_desktop_default() {
        let config = ListenerConfig::builder().require_host(true).build().unwrap();
        assert!(config.host_events.is_available());
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = ListenerConfig::builder()
            .host_events(null_host())
            .build()
            .unwrap();
        let cloned = config.clone();

        assert!(Arc::ptr_eq(&config.host_events, &cloned.host_events));
        assert!(format!("{:?}", cloned).contains("available: false"));
    }
}
