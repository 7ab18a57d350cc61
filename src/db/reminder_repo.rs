use sqlx::SqlitePool;

use super::{EditPolicy, StoreError};
use crate::models::{NewReminder, Reminder};

pub struct ReminderRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ReminderRow {
    id: i64,
    reminder_type: String,
    due_on: String,
    is_completed: i64,
    synced: i64,
}

impl ReminderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new reminder with `synced = false`.
    pub async fn upsert(&self, reminder: &NewReminder) -> Result<(), StoreError> {
        if reminder.reminder_type.trim().is_empty() {
            return Err(StoreError::Validation(
                "reminder type is required".to_string(),
            ));
        }

        sqlx::query(
            "INSERT INTO reminders (reminder_type, due_on, is_completed, synced) VALUES (?, ?, ?, 0)",
        )
        .bind(&reminder.reminder_type)
        .bind(reminder.due_on.to_string())
        .bind(reminder.is_completed)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Full table scan in insertion order.
    pub async fn fetch_all(&self) -> Result<Vec<Reminder>, StoreError> {
        let rows: Vec<ReminderRow> = sqlx::query_as("SELECT * FROM reminders ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Reminder {
                    id: row.id,
                    reminder_type: row.reminder_type,
                    due_on: row
                        .due_on
                        .parse()
                        .map_err(|e| StoreError::Validation(format!("invalid date: {}", e)))?,
                    is_completed: row.is_completed != 0,
                    synced: row.synced != 0,
                })
            })
            .collect()
    }

    /// Sets the completion flag of an existing reminder. The synced flag
    /// follows the edit policy, same as trip status edits.
    pub async fn set_completed(
        &self,
        id: i64,
        completed: bool,
        policy: EditPolicy,
    ) -> Result<(), StoreError> {
        let sql = match policy {
            EditPolicy::SyncOnce => "UPDATE reminders SET is_completed = ? WHERE id = ?",
            EditPolicy::Resync => "UPDATE reminders SET is_completed = ?, synced = 0 WHERE id = ?",
        };

        let result = sqlx::query(sql)
            .bind(completed)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "reminder",
                id,
            });
        }
        Ok(())
    }
}
