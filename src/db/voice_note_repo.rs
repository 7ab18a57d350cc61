use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::StoreError;
use crate::models::{NewVoiceNote, VoiceNote};

/// Repository for voice notes. Append-only: rows are never updated or
/// deleted, only inserted and eventually marked synced.
pub struct VoiceNoteRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct VoiceNoteRow {
    id: i64,
    transcript: String,
    language: String,
    created_at: String,
    synced: i64,
}

impl VoiceNoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, note: &NewVoiceNote) -> Result<(), StoreError> {
        if note.transcript.trim().is_empty() {
            return Err(StoreError::Validation(
                "voice note transcript is required".to_string(),
            ));
        }

        sqlx::query(
            "INSERT INTO voice_notes (transcript, language, created_at, synced) VALUES (?, ?, ?, 0)",
        )
        .bind(&note.transcript)
        .bind(note.language.to_string())
        .bind(note.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Full table scan in insertion order.
    pub async fn fetch_all(&self) -> Result<Vec<VoiceNote>, StoreError> {
        let rows: Vec<VoiceNoteRow> = sqlx::query_as("SELECT * FROM voice_notes ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(VoiceNote {
                    id: row.id,
                    transcript: row.transcript,
                    language: row.language.parse().map_err(StoreError::Validation)?,
                    created_at: DateTime::parse_from_rfc3339(&row.created_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| {
                            StoreError::Validation(format!("invalid timestamp: {}", e))
                        })?,
                    synced: row.synced != 0,
                })
            })
            .collect()
    }
}
