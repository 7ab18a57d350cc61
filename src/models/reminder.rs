use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A maintenance or paperwork reminder. Completion is toggled independently
/// of the other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub reminder_type: String,
    pub due_on: NaiveDate,
    pub is_completed: bool,
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub reminder_type: String,
    pub due_on: NaiveDate,
    pub is_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminder_json_roundtrip() {
        let reminder = Reminder {
            id: 3,
            reminder_type: "Insurance renewal".to_string(),
            due_on: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            is_completed: false,
            synced: true,
        };

        let json = serde_json::to_string(&reminder).unwrap();
        let parsed: Reminder = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reminder);
    }
}
