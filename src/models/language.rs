use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the app speaks to the driver in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Hi => write!(f, "hi"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "hi" => Ok(Language::Hi),
            _ => Err(format!("unknown language: {} (expected en or hi)", s)),
        }
    }
}
