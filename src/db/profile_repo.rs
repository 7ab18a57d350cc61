use sqlx::SqlitePool;

use super::StoreError;
use crate::models::{Language, Profile};

/// Repository for the singleton driver profile.
pub struct ProfileRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    name: String,
    preferred_language: String,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the profile, or `None` before first launch setup.
    pub async fn fetch(&self) -> Result<Option<Profile>, StoreError> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT name, preferred_language FROM profile WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(Some(Profile {
                name: row.name,
                preferred_language: row.preferred_language.parse().map_err(StoreError::Validation)?,
            })),
            None => Ok(None),
        }
    }

    /// Inserts the first profile row or replaces the existing one's fields in
    /// place. The row keeps its identity; there is never a second row.
    pub async fn upsert(&self, name: &str, language: Language) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::Validation("profile name is required".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO profile (id, name, preferred_language)
            VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                preferred_language = excluded.preferred_language
            "#,
        )
        .bind(name)
        .bind(language.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
