use sqlx::SqlitePool;

use super::{
    ExpenseRepository, ProfileRepository, ReminderRepository, StoreError, TripRepository,
    VoiceNoteRepository,
};
use crate::models::{Expense, Profile, Reminder, Trip, VoiceNote};

/// In-memory mirror of the store, rebuilt by a full re-read.
///
/// This is the one projection handed to the presentation layer. It is never
/// patched incrementally: after any mutation the affected table (or the whole
/// view) is re-read from the database, so the view cannot drift from stored
/// truth.
#[derive(Debug, Clone, Default)]
pub struct StoreView {
    pub profile: Option<Profile>,
    pub trips: Vec<Trip>,
    pub expenses: Vec<Expense>,
    pub reminders: Vec<Reminder>,
    pub voice_notes: Vec<VoiceNote>,
}

impl StoreView {
    /// Loads the full view from the database.
    pub async fn load(pool: &SqlitePool) -> Result<Self, StoreError> {
        Ok(Self {
            profile: ProfileRepository::new(pool.clone()).fetch().await?,
            trips: TripRepository::new(pool.clone()).fetch_all().await?,
            expenses: ExpenseRepository::new(pool.clone()).fetch_all().await?,
            reminders: ReminderRepository::new(pool.clone()).fetch_all().await?,
            voice_notes: VoiceNoteRepository::new(pool.clone()).fetch_all().await?,
        })
    }
}
