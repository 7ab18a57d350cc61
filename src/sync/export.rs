use sqlx::SqlitePool;

use super::SnapshotPayload;
use crate::db::{
    ExpenseRepository, ReminderRepository, StoreError, TripRepository, VoiceNoteRepository,
};

/// Assembles the full-state snapshot sent to the remote endpoint.
///
/// The snapshot is deliberately not filtered to unsynced rows: the endpoint
/// always receives the complete current state and simply overwrites what it
/// held before. The engine captures the unsynced ids from the returned
/// snapshot for later local reconciliation.
pub async fn export_all(pool: &SqlitePool) -> Result<SnapshotPayload, StoreError> {
    Ok(SnapshotPayload {
        trips: TripRepository::new(pool.clone()).fetch_all().await?,
        expenses: ExpenseRepository::new(pool.clone()).fetch_all().await?,
        reminders: ReminderRepository::new(pool.clone()).fetch_all().await?,
        voice_notes: VoiceNoteRepository::new(pool.clone()).fetch_all().await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, mark_entities_synced, SyncedTable};
    use crate::models::{ExpenseCategory, NewExpense, PaymentMode};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_includes_synced_and_unsynced_rows() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(temp_dir.path().join("test.db")).await.unwrap();
        let repo = ExpenseRepository::new(pool.clone());

        for amount in [100.0, 200.0] {
            repo.insert(&NewExpense {
                category: ExpenseCategory::Food,
                amount,
                payment_mode: PaymentMode::Cash,
                vendor: None,
                receipt_url: None,
                notes: None,
                occurred_on: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            })
            .await
            .unwrap();
        }
        mark_entities_synced(&pool, SyncedTable::Expenses, &[1])
            .await
            .unwrap();

        let snapshot = export_all(&pool).await.unwrap();
        assert_eq!(snapshot.expenses.len(), 2);
        assert!(snapshot.expenses[0].synced);
        assert!(!snapshot.expenses[1].synced);

        let captured = snapshot.unsynced_ids();
        assert_eq!(captured.expenses, vec![2]);
    }
}
