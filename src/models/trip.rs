use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripStatus {
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripStatus::Planned => write!(f, "Planned"),
            TripStatus::InProgress => write!(f, "In Progress"),
            TripStatus::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planned" => Ok(TripStatus::Planned),
            "in progress" | "in-progress" => Ok(TripStatus::InProgress),
            "completed" => Ok(TripStatus::Completed),
            _ => Err(format!(
                "Invalid trip status '{}'. Valid options: planned, in-progress, completed",
                s
            )),
        }
    }
}

/// A planned or recorded journey. `status` is mutated independently of the
/// other fields; everything else is fixed at insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub title: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub status: TripStatus,
    pub synced: bool,
}

/// Insert payload for a trip. The id and synced flag are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub title: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub status: TripStatus,
}
