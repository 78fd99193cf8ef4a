//! Lifecycle listener demonstration
//!
//! Wires a desktop host into the listener runtime, simulates window focus
//! changes and watches real connectivity for a few seconds.
//!
//! Run with:
//! ```bash
//! cargo run --example listeners_demo
//!
//! # With a custom filter
//! RUST_LOG=core_runtime=trace cargo run --example listeners_demo
//! ```

use anyhow::Result;
use bridge_desktop::{ConnectivityWatcher, DesktopHostEvents};
use bridge_traits::{LogLevel, VisibilityState};
use core_runtime::config::ListenerConfig;
use core_runtime::events::{EventStream, LifecycleStatus};
use core_runtime::listeners::ListenerRuntime;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let mut logging = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);
    if let Ok(filter) = std::env::var("RUST_LOG") {
        logging = logging.with_filter(filter);
    }
    init_logging(logging)?;

    let host = Arc::new(DesktopHostEvents::new());
    let config = ListenerConfig::builder()
        .host_events(host.clone())
        .require_host(true)
        .build()?;
    let runtime = ListenerRuntime::new(&config);

    let mut stream = EventStream::new(runtime.subscribe());
    let printer = tokio::spawn(async move {
        let mut status = LifecycleStatus::default();
        while let Ok(action) = stream.recv().await {
            status.apply(action);
            info!(
                action = %action,
                focused = status.focused,
                online = status.online,
                "Lifecycle notification"
            );
        }
    });

    let handle = runtime.start();
    info!(attached = handle.did_attach(), "Listeners installed");

    let watcher = ConnectivityWatcher::new()
        .interval(Duration::from_secs(1))
        .spawn(host.clone());

    host.set_visibility(VisibilityState::Hidden);
    tokio::time::sleep(Duration::from_millis(200)).await;
    host.set_visibility(VisibilityState::Visible);
    tokio::time::sleep(Duration::from_secs(3)).await;

    watcher.shutdown().await;
    handle.unsubscribe();
    drop(runtime);
    printer.await?;

    Ok(())
}
