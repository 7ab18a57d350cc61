//! Wire types for the sync endpoint.
//!
//! Field names are camelCase on the wire (`voiceNotes`, `receivedAt`);
//! entity fields keep their snake_case names.

use serde::{Deserialize, Serialize};

use crate::db::SyncedTable;
use crate::models::{Expense, Reminder, Trip, VoiceNote};

/// Full read of all in-scope tables at one instant, used as the sync payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub trips: Vec<Trip>,
    pub expenses: Vec<Expense>,
    pub reminders: Vec<Reminder>,
    pub voice_notes: Vec<VoiceNote>,
}

impl SnapshotPayload {
    /// Captures, per table, the ids that are unsynced in this snapshot.
    ///
    /// The capture comes from the snapshot itself rather than a later query,
    /// so rows inserted during the network round-trip can never be marked by
    /// the attempt that did not transmit them.
    pub fn unsynced_ids(&self) -> UnsyncedIds {
        UnsyncedIds {
            trips: ids_of(&self.trips, |t| (t.id, t.synced)),
            expenses: ids_of(&self.expenses, |e| (e.id, e.synced)),
            reminders: ids_of(&self.reminders, |r| (r.id, r.synced)),
            voice_notes: ids_of(&self.voice_notes, |v| (v.id, v.synced)),
        }
    }
}

fn ids_of<T>(rows: &[T], key: impl Fn(&T) -> (i64, bool)) -> Vec<i64> {
    rows.iter()
        .map(&key)
        .filter(|(_, synced)| !synced)
        .map(|(id, _)| id)
        .collect()
}

/// The per-table unsynced ids captured at snapshot time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsyncedIds {
    pub trips: Vec<i64>,
    pub expenses: Vec<i64>,
    pub reminders: Vec<i64>,
    pub voice_notes: Vec<i64>,
}

impl UnsyncedIds {
    pub fn for_table(&self, table: SyncedTable) -> &[i64] {
        match table {
            SyncedTable::Trips => &self.trips,
            SyncedTable::Expenses => &self.expenses,
            SyncedTable::Reminders => &self.reminders,
            SyncedTable::VoiceNotes => &self.voice_notes,
        }
    }

    pub fn is_empty(&self) -> bool {
        SyncedTable::ALL.iter().all(|t| self.for_table(*t).is_empty())
    }
}

/// Request body for `POST /sync`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    pub payload: SnapshotPayload,
    pub timestamp: String,
}

/// Acknowledgment from the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncAck {
    pub status: String,
    #[serde(rename = "receivedAt", skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
}
