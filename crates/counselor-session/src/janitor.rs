use crate::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

struct Running {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Background task that periodically evicts idle sessions.
///
/// Runs one sweep per `interval` against the shared store. A sweep holds the
/// store's write lock, so it either completes a full scan or is interrupted
/// only by process shutdown, never mid-scan by a request.
pub struct Janitor {
    store: Arc<dyn SessionStore>,
    interval: Duration,
    threshold: Duration,
    running: Mutex<Option<Running>>,
}

impl Janitor {
    /// Create a janitor for `store`. `interval` is the sweep period,
    /// `threshold` the staleness limit; both come from configuration.
    pub fn new(store: Arc<dyn SessionStore>, interval: Duration, threshold: Duration) -> Self {
        Self {
            store,
            interval,
            threshold,
            running: Mutex::new(None),
        }
    }

    /// Start the sweep task. Returns `false` if it is already running.
    pub async fn start(&self) -> bool {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return false;
        }

        let (shutdown, mut rx) = watch::channel(false);
        let store = self.store.clone();
        let interval = self.interval;
        let threshold = self.threshold;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately; skip it so the first sweep
            // happens one full interval after startup.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = store.evict_idle(threshold).await;
                        if evicted > 0 {
                            info!(evicted, "Janitor evicted idle sessions");
                        } else {
                            debug!("Janitor sweep found no idle sessions");
                        }
                    }
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Janitor stopped");
        });

        info!(
            interval_secs = self.interval.as_secs(),
            threshold_secs = self.threshold.as_secs(),
            "Janitor started"
        );
        *running = Some(Running { shutdown, handle });
        true
    }

    /// Whether the sweep task is currently running.
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Stop the sweep task and wait for it to exit. No-op if not running.
    pub async fn shutdown(&self) {
        let running = self.running.lock().await.take();
        if let Some(Running { shutdown, handle }) = running {
            let _ = shutdown.send(true);
            let _ = handle.await;
            info!("Janitor shut down");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;
    use counselor_core::Message;

    #[tokio::test]
    async fn test_duplicate_start_rejected() {
        let store = Arc::new(MemorySessionStore::new());
        let janitor = Janitor::new(store, Duration::from_secs(60), Duration::from_secs(60));
        assert!(janitor.start().await);
        assert!(!janitor.start().await);
        janitor.shutdown().await;
        assert!(!janitor.is_running().await);
    }

    #[tokio::test]
    async fn test_shutdown_without_start_is_noop() {
        let store = Arc::new(MemorySessionStore::new());
        let janitor = Janitor::new(store, Duration::from_secs(60), Duration::from_secs(60));
        janitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_stale_sessions() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .append(
                "s",
                vec![
                    Message::user("hello"),
                    Message::assistant("hi there"),
                    Message::user("one more thing"),
                ],
            )
            .await;
        // Staleness is measured on the wall clock; let a little real time pass
        // so a zero threshold classifies the session as idle.
        std::thread::sleep(Duration::from_millis(10));

        let janitor = Janitor::new(store.clone(), Duration::from_secs(10), Duration::ZERO);
        assert!(janitor.start().await);
        // Let the spawned janitor task get polled so its ticker is anchored
        // before the clock moves.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // Advance the (paused) tokio clock past one sweep interval and let
        // the janitor task run.
        tokio::time::advance(Duration::from_secs(11)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(store.session_count().await, 0);
        janitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_recently_touched_session_survives_sweep() {
        let store = Arc::new(MemorySessionStore::new());
        let janitor = Janitor::new(
            store.clone(),
            Duration::from_secs(10),
            Duration::from_secs(300),
        );
        assert!(janitor.start().await);

        store.append("s", vec![Message::user("hello")]).await;
        tokio::time::advance(Duration::from_secs(11)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(store.session_count().await, 1);
        janitor.shutdown().await;
    }
}
