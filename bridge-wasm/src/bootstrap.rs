//! Convenience helpers for picking the host event target at startup.
//!
//! Host shells call [`detect_host_events`] once and inject the result into
//! the core. The window check happens here, at construction time, so the
//! core never probes globals itself.

use std::sync::Arc;

use bridge_traits::host_events::{HostEventTarget, NullHostEvents};
use tracing::debug;

use crate::host_events::WebHostEvents;

/// Browser target when a `window` exists, otherwise [`NullHostEvents`].
pub fn detect_host_events() -> Arc<dyn HostEventTarget> {
    match WebHostEvents::from_window() {
        Some(target) => Arc::new(target),
        None => {
            debug!("No window available; lifecycle listeners disabled");
            Arc::new(NullHostEvents)
        }
    }
}
