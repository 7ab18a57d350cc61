mod expense_repo;
mod profile_repo;
mod reminder_repo;
mod trip_repo;
mod view;
mod voice_note_repo;

pub use expense_repo::ExpenseRepository;
pub use profile_repo::ProfileRepository;
pub use reminder_repo::ReminderRepository;
pub use trip_repo::TripRepository;
pub use view::StoreView;
pub use voice_note_repo::VoiceNoteRepository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Errors surfaced by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing required field on a write; rejected before any
    /// row is created.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Mutation referencing a nonexistent identifier; no partial effect.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What happens to the `synced` flag when a status or completion field is
/// edited after the row has already synced.
///
/// `SyncOnce` leaves the flag untouched, so such edits never propagate to the
/// remote endpoint again. `Resync` resets the flag so the next attempt
/// retransmits the row. `SyncOnce` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPolicy {
    #[default]
    SyncOnce,
    Resync,
}

impl EditPolicy {
    pub fn from_config(resync_on_edit: bool) -> Self {
        if resync_on_edit {
            EditPolicy::Resync
        } else {
            EditPolicy::SyncOnce
        }
    }
}

/// Table selector for the synced-flag bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncedTable {
    Trips,
    Expenses,
    Reminders,
    VoiceNotes,
}

impl SyncedTable {
    pub const ALL: [SyncedTable; 4] = [
        SyncedTable::Trips,
        SyncedTable::Expenses,
        SyncedTable::Reminders,
        SyncedTable::VoiceNotes,
    ];

    /// Returns the SQL table name for this selector.
    pub fn table_name(&self) -> &'static str {
        match self {
            SyncedTable::Trips => "trips",
            SyncedTable::Expenses => "expenses",
            SyncedTable::Reminders => "reminders",
            SyncedTable::VoiceNotes => "voice_notes",
        }
    }
}

/// Marks the given rows as acknowledged by the remote endpoint.
///
/// Only rows that exist and are currently unsynced are touched; unknown ids
/// are silently ignored, so repeated calls with the same ids are idempotent.
/// Returns the number of rows that actually flipped.
pub async fn mark_entities_synced(
    pool: &SqlitePool,
    table: SyncedTable,
    ids: &[i64],
) -> Result<u64, StoreError> {
    if ids.is_empty() {
        return Ok(0);
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "UPDATE {} SET synced = 1 WHERE synced = 0 AND id IN ({})",
        table.table_name(),
        placeholders
    );

    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

/// Initialize the database connection pool and run migrations.
///
/// A failure to open or migrate the persisted image is returned to the
/// caller rather than swallowed; the sync engine is never constructed over a
/// store that did not load.
pub async fn init_db(db_path: PathBuf) -> Result<SqlitePool, sqlx::Error> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| sqlx::Error::Io(e))?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
