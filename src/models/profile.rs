use serde::{Deserialize, Serialize};

use super::Language;

/// The driver's profile. A singleton: setting it again replaces the fields
/// of the one existing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub preferred_language: Language,
}
