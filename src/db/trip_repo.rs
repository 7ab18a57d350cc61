use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{EditPolicy, StoreError};
use crate::models::{NewTrip, Trip, TripStatus};

pub struct TripRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: i64,
    title: String,
    origin: String,
    destination: String,
    departure_time: String,
    arrival_time: Option<String>,
    notes: Option<String>,
    status: String,
    synced: i64,
}

impl TripRow {
    fn into_trip(self) -> Result<Trip, StoreError> {
        Ok(Trip {
            id: self.id,
            title: self.title,
            origin: self.origin,
            destination: self.destination,
            departure_time: parse_timestamp(&self.departure_time)?,
            arrival_time: self
                .arrival_time
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            notes: self.notes,
            status: self.status.parse().map_err(StoreError::Validation)?,
            synced: self.synced != 0,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Validation(format!("invalid timestamp '{}': {}", s, e)))
}

impl TripRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new trip with `synced = false`. Callers re-fetch the table
    /// afterwards rather than patching their own view.
    pub async fn insert(&self, trip: &NewTrip) -> Result<(), StoreError> {
        if trip.title.trim().is_empty() {
            return Err(StoreError::Validation("trip title is required".to_string()));
        }
        if trip.origin.trim().is_empty() || trip.destination.trim().is_empty() {
            return Err(StoreError::Validation(
                "trip origin and destination are required".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO trips (title, origin, destination, departure_time, arrival_time, notes, status, synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&trip.title)
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(trip.departure_time.to_rfc3339())
        .bind(trip.arrival_time.map(|t| t.to_rfc3339()))
        .bind(&trip.notes)
        .bind(trip.status.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Full table scan in insertion order.
    pub async fn fetch_all(&self) -> Result<Vec<Trip>, StoreError> {
        let rows: Vec<TripRow> = sqlx::query_as("SELECT * FROM trips ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TripRow::into_trip).collect()
    }

    /// Sets the status of an existing trip.
    ///
    /// Under `EditPolicy::SyncOnce` the synced flag is left untouched; under
    /// `EditPolicy::Resync` the row is made unsynced again so the edit is
    /// picked up by the next sync attempt.
    pub async fn update_status(
        &self,
        id: i64,
        status: TripStatus,
        policy: EditPolicy,
    ) -> Result<(), StoreError> {
        let sql = match policy {
            EditPolicy::SyncOnce => "UPDATE trips SET status = ? WHERE id = ?",
            EditPolicy::Resync => "UPDATE trips SET status = ?, synced = 0 WHERE id = ?",
        };

        let result = sqlx::query(sql)
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "trip", id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    async fn setup_repo() -> (TripRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(temp_dir.path().join("test.db")).await.unwrap();
        (TripRepository::new(pool), temp_dir)
    }

    fn sample_trip(title: &str) -> NewTrip {
        NewTrip {
            title: title.to_string(),
            origin: "Mumbai".to_string(),
            destination: "Pune".to_string(),
            departure_time: Utc::now(),
            arrival_time: None,
            notes: None,
            status: TripStatus::Planned,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_in_insertion_order() {
        let (repo, _temp) = setup_repo().await;

        repo.insert(&sample_trip("Trip A")).await.unwrap();
        repo.insert(&sample_trip("Trip B")).await.unwrap();
        repo.insert(&sample_trip("Trip C")).await.unwrap();

        let trips = repo.fetch_all().await.unwrap();
        assert_eq!(trips.len(), 3);
        assert_eq!(trips[0].title, "Trip A");
        assert_eq!(trips[2].title, "Trip C");

        // Ids are unique and strictly increasing.
        assert!(trips.windows(2).all(|w| w[0].id < w[1].id));

        // Fresh rows are always unsynced.
        assert!(trips.iter().all(|t| !t.synced));
    }

    #[tokio::test]
    async fn test_insert_validates_required_fields() {
        let (repo, _temp) = setup_repo().await;

        let mut trip = sample_trip("");
        assert!(matches!(
            repo.insert(&trip).await,
            Err(StoreError::Validation(_))
        ));

        trip.title = "Valid".to_string();
        trip.destination = "".to_string();
        assert!(matches!(
            repo.insert(&trip).await,
            Err(StoreError::Validation(_))
        ));

        assert!(repo.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status() {
        let (repo, _temp) = setup_repo().await;

        repo.insert(&sample_trip("Trip")).await.unwrap();
        repo.update_status(1, TripStatus::InProgress, EditPolicy::SyncOnce)
            .await
            .unwrap();

        let trips = repo.fetch_all().await.unwrap();
        assert_eq!(trips[0].status, TripStatus::InProgress);
    }

    #[tokio::test]
    async fn test_update_status_unknown_id() {
        let (repo, _temp) = setup_repo().await;

        let result = repo
            .update_status(42, TripStatus::Completed, EditPolicy::SyncOnce)
            .await;
        assert!(matches!(
            result,
            Err(StoreError::NotFound { entity: "trip", id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_edit_policy_controls_synced_flag() {
        let (repo, _temp) = setup_repo().await;

        repo.insert(&sample_trip("Trip")).await.unwrap();
        crate::db::mark_entities_synced(&repo.pool, crate::db::SyncedTable::Trips, &[1])
            .await
            .unwrap();

        // SyncOnce: the flag survives a status edit.
        repo.update_status(1, TripStatus::InProgress, EditPolicy::SyncOnce)
            .await
            .unwrap();
        assert!(repo.fetch_all().await.unwrap()[0].synced);

        // Resync: the edit makes the row unsynced again.
        repo.update_status(1, TripStatus::Completed, EditPolicy::Resync)
            .await
            .unwrap();
        assert!(!repo.fetch_all().await.unwrap()[0].synced);
    }
}
