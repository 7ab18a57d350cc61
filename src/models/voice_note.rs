use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Language;

/// A transcribed voice note. Append-only: there is no update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceNote {
    pub id: i64,
    pub transcript: String,
    pub language: Language,
    pub created_at: DateTime<Utc>,
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct NewVoiceNote {
    pub transcript: String,
    pub language: Language,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_note_json_roundtrip() {
        let note = VoiceNote {
            id: 7,
            transcript: "Diesel filled at Manor highway".to_string(),
            language: Language::Hi,
            created_at: Utc::now(),
            synced: false,
        };

        let json = serde_json::to_string(&note).unwrap();
        let parsed: VoiceNote = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, note);
    }
}
