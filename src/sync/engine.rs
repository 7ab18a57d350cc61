use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::{export_all, SyncError, SyncRequest, SyncTransport};
use crate::db::{self, StoreError, StoreView, SyncedTable};

/// Where the engine currently stands with the remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Status value consumed by the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub status: SyncStatus,
    /// Acknowledgment timestamp of the last successful attempt.
    pub last_sync: Option<DateTime<Utc>>,
    /// Human-readable message from the last failed attempt.
    pub error: Option<String>,
}

/// What a call to [`SyncEngine::sync_with_cloud`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed,
    Failed,
    /// Another attempt was already in flight; this trigger was a no-op.
    InFlight,
}

/// Orchestrates one sync attempt: export, transmit, reconcile, refresh.
///
/// Attempts are single-flight: a trigger while one is pending returns
/// [`SyncOutcome::InFlight`] without touching anything. Failures are absorbed
/// into the state rather than propagated, so callers (including the
/// scheduler) can fire and forget.
pub struct SyncEngine<T> {
    pool: SqlitePool,
    transport: T,
    state: Mutex<SyncState>,
    view: Mutex<StoreView>,
    flight: tokio::sync::Mutex<()>,
}

impl<T: SyncTransport> SyncEngine<T> {
    pub fn new(pool: SqlitePool, transport: T) -> Self {
        Self {
            pool,
            transport,
            state: Mutex::new(SyncState::default()),
            view: Mutex::new(StoreView::default()),
            flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> SyncState {
        self.lock(&self.state).clone()
    }

    /// The in-memory mirror of the store, as of the last refresh.
    pub fn view(&self) -> StoreView {
        self.lock(&self.view).clone()
    }

    /// Rebuilds the view with a full re-read of every table.
    pub async fn refresh_view(&self) -> Result<(), StoreError> {
        let view = StoreView::load(&self.pool).await?;
        *self.lock(&self.view) = view;
        Ok(())
    }

    /// Runs one sync attempt against the remote endpoint.
    ///
    /// The unsynced ids are captured from the snapshot before transmission,
    /// so a row inserted while the request is on the wire is never marked by
    /// this attempt; the next one picks it up.
    pub async fn sync_with_cloud(&self) -> SyncOutcome {
        let _flight = match self.flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("sync trigger ignored: attempt already in flight");
                return SyncOutcome::InFlight;
            }
        };

        {
            let mut state = self.lock(&self.state);
            state.status = SyncStatus::Pending;
            state.error = None;
        }

        match self.run_attempt().await {
            Ok(received_at) => {
                let mut state = self.lock(&self.state);
                state.status = SyncStatus::Success;
                state.last_sync = Some(received_at);
                info!(received_at = %received_at, "sync completed");
                SyncOutcome::Completed
            }
            Err(e) => {
                warn!("sync attempt failed: {}", e);
                let mut state = self.lock(&self.state);
                state.status = SyncStatus::Error;
                state.error = Some(e.to_string());
                SyncOutcome::Failed
            }
        }
    }

    async fn run_attempt(&self) -> Result<DateTime<Utc>, SyncError> {
        let snapshot = export_all(&self.pool).await?;
        let captured = snapshot.unsynced_ids();

        let request = SyncRequest {
            payload: snapshot,
            timestamp: Utc::now().to_rfc3339(),
        };
        let ack = self.transport.push(&request).await?;

        // Independent per-table updates: an interruption here leaves some
        // tables marked and some not, which the next full re-send repairs.
        for table in SyncedTable::ALL {
            db::mark_entities_synced(&self.pool, table, captured.for_table(table)).await?;
        }

        self.refresh_view().await?;

        let received_at = ack
            .received_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        Ok(received_at)
    }

    fn lock<'a, U>(&self, mutex: &'a Mutex<U>) -> MutexGuard<'a, U> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, ExpenseRepository};
    use crate::models::{ExpenseCategory, NewExpense, PaymentMode};
    use crate::sync::SyncAck;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    fn fuel_expense() -> NewExpense {
        NewExpense {
            category: ExpenseCategory::Fuel,
            amount: 500.0,
            payment_mode: PaymentMode::Cash,
            vendor: None,
            receipt_url: None,
            notes: None,
            occurred_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    async fn setup_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(temp_dir.path().join("test.db")).await.unwrap();
        (pool, temp_dir)
    }

    /// Transport that acknowledges or fails without any network.
    struct MockTransport {
        fail: bool,
        received_at: Option<String>,
        calls: Arc<AtomicUsize>,
    }

    impl MockTransport {
        fn ok(received_at: &str) -> Self {
            Self {
                fail: false,
                received_at: Some(received_at.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                received_at: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl SyncTransport for MockTransport {
        async fn push(&self, _request: &SyncRequest) -> Result<SyncAck, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SyncError::Transport("connection refused".to_string()));
            }
            Ok(SyncAck {
                status: "ok".to_string(),
                received_at: self.received_at.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_successful_sync_marks_rows_and_sets_last_sync() {
        let (pool, _temp) = setup_pool().await;
        let repo = ExpenseRepository::new(pool.clone());
        repo.insert(&fuel_expense()).await.unwrap();

        let engine = SyncEngine::new(pool, MockTransport::ok("2024-05-05T10:00:00Z"));
        let outcome = engine.sync_with_cloud().await;
        assert_eq!(outcome, SyncOutcome::Completed);

        let expenses = repo.fetch_all().await.unwrap();
        assert!(expenses[0].synced);

        let state = engine.state();
        assert_eq!(state.status, SyncStatus::Success);
        assert!(state.error.is_none());
        assert_eq!(
            state.last_sync.unwrap().to_rfc3339(),
            "2024-05-05T10:00:00+00:00"
        );

        // The view was refreshed from the store after marking.
        assert!(engine.view().expenses[0].synced);
    }

    #[tokio::test]
    async fn test_failed_sync_leaves_flags_and_records_error() {
        let (pool, _temp) = setup_pool().await;
        let repo = ExpenseRepository::new(pool.clone());
        repo.insert(&fuel_expense()).await.unwrap();

        let engine = SyncEngine::new(pool, MockTransport::failing());
        let outcome = engine.sync_with_cloud().await;
        assert_eq!(outcome, SyncOutcome::Failed);

        let expenses = repo.fetch_all().await.unwrap();
        assert!(!expenses[0].synced);

        let state = engine.state();
        assert_eq!(state.status, SyncStatus::Error);
        assert!(!state.error.unwrap().is_empty());
        assert!(state.last_sync.is_none());
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() {
        let (pool, _temp) = setup_pool().await;
        let repo = ExpenseRepository::new(pool.clone());
        repo.insert(&fuel_expense()).await.unwrap();

        let engine = SyncEngine::new(pool.clone(), MockTransport::failing());
        assert_eq!(engine.sync_with_cloud().await, SyncOutcome::Failed);

        let engine = SyncEngine::new(pool, MockTransport::ok("2024-05-05T10:00:00Z"));
        assert_eq!(engine.sync_with_cloud().await, SyncOutcome::Completed);
        assert!(repo.fetch_all().await.unwrap()[0].synced);
    }

    #[tokio::test]
    async fn test_last_sync_falls_back_to_local_time() {
        let (pool, _temp) = setup_pool().await;

        let engine = SyncEngine::new(
            pool,
            MockTransport {
                fail: false,
                received_at: None,
                calls: Arc::new(AtomicUsize::new(0)),
            },
        );
        let before = Utc::now();
        engine.sync_with_cloud().await;
        let last_sync = engine.state().last_sync.unwrap();
        assert!(last_sync >= before && last_sync <= Utc::now());
    }

    /// Transport that inserts a row while the "network call" is in flight.
    struct RacyTransport {
        pool: SqlitePool,
        inserted: AtomicUsize,
    }

    impl SyncTransport for RacyTransport {
        async fn push(&self, _request: &SyncRequest) -> Result<SyncAck, SyncError> {
            // A user logs an expense between snapshot capture and ack.
            ExpenseRepository::new(self.pool.clone())
                .insert(&fuel_expense())
                .await
                .unwrap();
            self.inserted.fetch_add(1, Ordering::SeqCst);
            Ok(SyncAck {
                status: "ok".to_string(),
                received_at: None,
            })
        }
    }

    #[tokio::test]
    async fn test_row_inserted_mid_flight_stays_unsynced() {
        let (pool, _temp) = setup_pool().await;
        let repo = ExpenseRepository::new(pool.clone());
        repo.insert(&fuel_expense()).await.unwrap();

        let engine = SyncEngine::new(
            pool.clone(),
            RacyTransport {
                pool,
                inserted: AtomicUsize::new(0),
            },
        );
        assert_eq!(engine.sync_with_cloud().await, SyncOutcome::Completed);

        let expenses = repo.fetch_all().await.unwrap();
        assert_eq!(expenses.len(), 2);
        // The snapshotted row was marked; the mid-flight insert was not.
        assert!(expenses[0].synced);
        assert!(!expenses[1].synced);
    }

    /// Transport that blocks until released, for observing the pending state.
    struct GatedTransport {
        started: Arc<Notify>,
        release: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    impl SyncTransport for GatedTransport {
        async fn push(&self, _request: &SyncRequest) -> Result<SyncAck, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            self.release.notified().await;
            Ok(SyncAck {
                status: "ok".to_string(),
                received_at: None,
            })
        }
    }

    #[tokio::test]
    async fn test_single_flight_second_trigger_is_noop() {
        let (pool, _temp) = setup_pool().await;

        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let engine = Arc::new(SyncEngine::new(
            pool,
            GatedTransport {
                started: started.clone(),
                release: release.clone(),
                calls: calls.clone(),
            },
        ));

        let first = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.sync_with_cloud().await })
        };

        started.notified().await;
        assert_eq!(engine.state().status, SyncStatus::Pending);

        // Triggers while pending are no-ops: no second transmission.
        assert_eq!(engine.sync_with_cloud().await, SyncOutcome::InFlight);
        assert_eq!(engine.sync_with_cloud().await, SyncOutcome::InFlight);

        release.notify_one();
        assert_eq!(first.await.unwrap(), SyncOutcome::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
