//! Connectivity Watcher
//!
//! Desktop operating systems do not hand us `online`/`offline` events in a
//! portable way, so the watcher polls a reachability probe and raises the
//! events on a [`DesktopHostEvents`] target whenever the status flips.

use crate::host_events::DesktopHostEvents;
use bridge_traits::host_events::HostEventKind;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// Default reachability endpoint (public DNS resolver).
pub const DEFAULT_PROBE_ADDR: &str = "8.8.8.8:53";
/// Default delay between probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Connect timeout for the default TCP probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Boxed future returned by a probe.
pub type ProbeFuture = Pin<Box<dyn Future<Output = bool> + Send>>;

/// Reachability probe; resolves to `true` when the network is usable.
pub type ConnectivityProbe = Arc<dyn Fn() -> ProbeFuture + Send + Sync>;

/// Polls connectivity and emits `online`/`offline` on change.
pub struct ConnectivityWatcher {
    probe: ConnectivityProbe,
    interval: Duration,
    last_known: Option<bool>,
}

impl ConnectivityWatcher {
    /// Watcher using a TCP connect to [`DEFAULT_PROBE_ADDR`].
    pub fn new() -> Self {
        Self::tcp(DEFAULT_PROBE_ADDR)
    }

    /// Watcher using a TCP connect to `addr`.
    pub fn tcp(addr: impl Into<String>) -> Self {
        let addr: Arc<str> = Arc::from(addr.into());
        Self::with_probe(move || {
            let addr = Arc::clone(&addr);
            async move {
                matches!(
                    tokio::time::timeout(
                        DEFAULT_PROBE_TIMEOUT,
                        tokio::net::TcpStream::connect(addr.as_ref()),
                    )
                    .await,
                    Ok(Ok(_))
                )
            }
        })
    }

    /// Watcher using a custom probe.
    pub fn with_probe<F, Fut>(probe: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self {
            probe: Arc::new(move || Box::pin(probe()) as ProbeFuture),
            interval: DEFAULT_POLL_INTERVAL,
            last_known: None,
        }
    }

    /// Delay between probes.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Seed the last known status.
    ///
    /// Without a seed the first probe only records a baseline; with one, a
    /// first probe that disagrees emits immediately.
    pub fn assume_online(mut self, online: bool) -> Self {
        self.last_known = Some(online);
        self
    }

    /// Start polling on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(self, target: Arc<DesktopHostEvents>) -> WatcherHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(self.run(target, token.clone()));
        WatcherHandle {
            _cancel_on_drop: token.clone().drop_guard(),
            token,
            task,
        }
    }

    async fn run(self, target: Arc<DesktopHostEvents>, token: CancellationToken) {
        let mut last_known = self.last_known;
        debug!(interval_ms = self.interval.as_millis() as u64, "Connectivity watcher started");

        loop {
            let online = tokio::select! {
                _ = token.cancelled() => break,
                online = (self.probe)() => online,
            };

            match last_known {
                Some(previous) if previous == online => {}
                Some(_) => {
                    let kind = if online {
                        HostEventKind::Online
                    } else {
                        HostEventKind::Offline
                    };
                    info!(event = %kind, "Connectivity changed");
                    target.emit(kind);
                }
                None => debug!(online, "Connectivity baseline recorded"),
            }
            last_known = Some(online);

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        debug!("Connectivity watcher stopped");
    }
}

impl Default for ConnectivityWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running [`ConnectivityWatcher`].
///
/// Dropping the handle stops the watcher.
pub struct WatcherHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
    _cancel_on_drop: DropGuard,
}

impl WatcherHandle {
    /// Request the watcher to stop. Idempotent.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the watcher and wait for the task to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(err) = self.task.await {
            if err.is_panic() {
                warn!(error = %err, "Connectivity watcher panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::host_events::HostEventTarget;
    use bridge_traits::platform::shared_callback;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn counting(host: &DesktopHostEvents, kind: HostEventKind) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let clone = Arc::clone(&count);
        host.add_listener(
            kind,
            shared_callback(move || {
                clone.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        count
    }

    async fn wait_for(count: &AtomicUsize, expected: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while count.load(Ordering::SeqCst) < expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("event not observed in time");
    }

    #[tokio::test]
    async fn test_emits_on_status_flip() {
        let host = Arc::new(DesktopHostEvents::new());
        let online = counting(&host, HostEventKind::Online);
        let offline = counting(&host, HostEventKind::Offline);

        let reachable = Arc::new(AtomicBool::new(true));
        let probe_state = Arc::clone(&reachable);
        let handle = ConnectivityWatcher::with_probe(move || {
            let up = probe_state.load(Ordering::SeqCst);
            async move { up }
        })
        .interval(Duration::from_millis(10))
        .spawn(Arc::clone(&host));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(online.load(Ordering::SeqCst), 0);

        reachable.store(false, Ordering::SeqCst);
        wait_for(&offline, 1).await;

        reachable.store(true, Ordering::SeqCst);
        wait_for(&online, 1).await;

        handle.shutdown().await;
        assert_eq!(offline.load(Ordering::SeqCst), 1);
        assert_eq!(online.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_seeded_status_emits_on_first_probe() {
        let host = Arc::new(DesktopHostEvents::new());
        let offline = counting(&host, HostEventKind::Offline);

        let handle = ConnectivityWatcher::with_probe(|| async { false })
            .assume_online(true)
            .interval(Duration::from_millis(10))
            .spawn(Arc::clone(&host));

        wait_for(&offline, 1).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        handle.shutdown().await;

        assert_eq!(offline.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_ends_task() {
        let host = Arc::new(DesktopHostEvents::new());
        let handle = ConnectivityWatcher::with_probe(|| async { true })
            .interval(Duration::from_millis(10))
            .spawn(host);

        handle.stop();
        handle.stop();

        tokio::time::timeout(Duration::from_secs(1), async {
            while !handle.is_stopped() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_task() {
        let host = Arc::new(DesktopHostEvents::new());
        let probes = Arc::new(AtomicUsize::new(0));
        let probe_count = Arc::clone(&probes);

        let handle = ConnectivityWatcher::with_probe(move || {
            probe_count.fetch_add(1, Ordering::SeqCst);
            async { true }
        })
        .interval(Duration::from_millis(5))
        .spawn(Arc::clone(&host));

        wait_for(&probes, 2).await;
        drop(handle);

        tokio::time::timeout(Duration::from_secs(1), async {
            while Arc::strong_count(&host) > 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("watcher kept the host alive after drop");

        let after_drop = probes.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(probes.load(Ordering::SeqCst), after_drop);
    }
}
