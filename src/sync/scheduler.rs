use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{check_server, SyncEngine, SyncTransport};

/// Decides when to invoke the sync engine without operator action.
///
/// Triggers: once at startup, on a fixed interval while running, and on the
/// offline-to-online connectivity transition. Triggers that fire while
/// offline, or while an attempt is already in flight, are no-ops.
///
/// The ticker and the connectivity subscription live inside one task;
/// dropping the scheduler aborts it, so both are torn down together on every
/// exit path.
pub struct SyncScheduler {
    handle: JoinHandle<()>,
}

impl SyncScheduler {
    pub fn start<T>(
        engine: Arc<SyncEngine<T>>,
        connectivity: watch::Receiver<bool>,
        interval: Duration,
    ) -> Self
    where
        T: SyncTransport + Send + Sync + 'static,
    {
        let handle = tokio::spawn(run_loop(engine, connectivity, interval));
        Self { handle }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_loop<T>(
    engine: Arc<SyncEngine<T>>,
    mut connectivity: watch::Receiver<bool>,
    interval: Duration,
) where
    T: SyncTransport + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick completes immediately: the app-start attempt.
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if *connectivity.borrow() {
                    engine.sync_with_cloud().await;
                } else {
                    debug!("scheduled sync skipped: offline");
                }
            }
            changed = connectivity.changed() => {
                if changed.is_err() {
                    break;
                }
                if *connectivity.borrow_and_update() {
                    debug!("connectivity regained, syncing");
                    engine.sync_with_cloud().await;
                }
            }
        }
    }
}

/// Polls the endpoint's health route and publishes online/offline
/// transitions to a watch channel the scheduler subscribes to.
pub struct ConnectivityWatcher {
    rx: watch::Receiver<bool>,
    handle: JoinHandle<()>,
}

impl ConnectivityWatcher {
    pub fn start(server_url: String, poll_interval: Duration) -> Self {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            loop {
                let online = check_server(&server_url).await;
                tx.send_if_modified(|current| {
                    if *current != online {
                        *current = online;
                        true
                    } else {
                        false
                    }
                });
                tokio::time::sleep(poll_interval).await;
            }
        });
        Self { rx, handle }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    pub fn is_online(&self) -> bool {
        *self.rx.borrow()
    }
}

impl Drop for ConnectivityWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::sync::{SyncAck, SyncError, SyncRequest};
    use sqlx::SqlitePool;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingTransport {
        calls: Arc<AtomicUsize>,
    }

    impl SyncTransport for CountingTransport {
        async fn push(&self, _request: &SyncRequest) -> Result<SyncAck, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SyncAck {
                status: "ok".to_string(),
                received_at: None,
            })
        }
    }

    async fn setup_engine() -> (Arc<SyncEngine<CountingTransport>>, Arc<AtomicUsize>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool: SqlitePool = init_db(temp_dir.path().join("test.db")).await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = Arc::new(SyncEngine::new(
            pool,
            CountingTransport {
                calls: calls.clone(),
            },
        ));
        (engine, calls, temp_dir)
    }

    #[tokio::test]
    async fn test_offline_triggers_are_noops() {
        let (engine, calls, _temp) = setup_engine().await;
        let (_tx, rx) = watch::channel(false);

        let _scheduler = SyncScheduler::start(engine, rx, Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_startup_trigger_fires_when_online() {
        let (engine, calls, _temp) = setup_engine().await;
        let (_tx, rx) = watch::channel(true);

        let _scheduler = SyncScheduler::start(engine, rx, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connectivity_regained_fires_immediately() {
        let (engine, calls, _temp) = setup_engine().await;
        let (tx, rx) = watch::channel(false);

        let _scheduler = SyncScheduler::start(engine, rx, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tx.send(true).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_periodic_triggers_while_online() {
        let (engine, calls, _temp) = setup_engine().await;
        let (_tx, rx) = watch::channel(true);

        let _scheduler = SyncScheduler::start(engine, rx, Duration::from_millis(30));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_drop_tears_down_the_timer() {
        let (engine, calls, _temp) = setup_engine().await;
        let (_tx, rx) = watch::channel(true);

        let scheduler = SyncScheduler::start(engine, rx, Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(70)).await;
        drop(scheduler);

        let after_drop = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_drop);
    }
}
