use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Base URL of the sync endpoint
    pub server_url: Option<String>,
    /// API key identifying this device to the sync endpoint
    pub api_key: Option<String>,
    /// Whether `sync watch` also runs an interval timer
    pub auto_sync: bool,
    /// Seconds between scheduled sync attempts
    pub sync_interval_secs: u64,
    /// Whether status/completion edits make an already-synced row unsynced
    /// again. Off by default: rows sync once.
    pub resync_on_edit: bool,
}

impl Default for Config {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self {
            database_path: PathBuf::from(&home).join(".sarathi").join("sarathi.db"),
            server_url: None,
            api_key: None,
            auto_sync: true,
            sync_interval_secs: 60,
            resync_on_edit: false,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("SARATHI_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(server_url) = std::env::var("SARATHI_SERVER_URL") {
            config.server_url = Some(server_url);
        }
        if let Ok(api_key) = std::env::var("SARATHI_API_KEY") {
            config.api_key = Some(api_key);
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/sarathi/config.yaml
    pub fn default_config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("sarathi")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database_path.to_string_lossy().contains("sarathi.db"));
        assert!(config.server_url.is_none());
        assert_eq!(config.sync_interval_secs, 60);
        assert!(!config.resync_on_edit);
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.auto_sync);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/db.sqlite").unwrap();
        writeln!(file, "server_url: http://sync.example.com").unwrap();
        writeln!(file, "sync_interval_secs: 120").unwrap();
        writeln!(file, "resync_on_edit: true").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/custom/path/db.sqlite"));
        assert_eq!(config.server_url.as_deref(), Some("http://sync.example.com"));
        assert_eq!(config.sync_interval_secs, 120);
        assert!(config.resync_on_edit);
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
    }
}
