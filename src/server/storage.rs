//! Server-side snapshot storage.
//!
//! Keeps one snapshot per device in the following structure:
//! ```text
//! <DATA_DIR>/
//!   <device_id>/
//!     snapshot.json
//! ```
//!
//! Each upload overwrites the device's previous snapshot (last-write-wins, no
//! history): the client always transmits full state, so nothing older is
//! worth keeping.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::sync::SnapshotPayload;

const SNAPSHOT_FILE: &str = "snapshot.json";

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("I/O error for {0}: {1}")]
    Io(PathBuf, #[source] io::Error),
    #[error("failed to decode snapshot {0}: {1}")]
    Decode(PathBuf, #[source] serde_json::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    /// Invalid device id (empty, or contains path separators).
    #[error("invalid device id: {0}")]
    InvalidDeviceId(String),
}

/// A snapshot as stored on the server, with the acknowledgment timestamp
/// echoed back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub payload: SnapshotPayload,
    pub timestamp: String,
    #[serde(rename = "receivedAt")]
    pub received_at: String,
}

/// Keyed snapshot store with explicit upsert, one slot per device.
#[derive(Debug, Clone)]
pub struct SnapshotVault {
    data_dir: PathBuf,
}

impl SnapshotVault {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Rejects device ids that could traverse out of the data directory.
    fn validate_device_id(device_id: &str) -> Result<(), VaultError> {
        if device_id.is_empty()
            || device_id.contains('/')
            || device_id.contains('\\')
            || device_id.contains("..")
            || device_id.starts_with('.')
        {
            return Err(VaultError::InvalidDeviceId(device_id.to_string()));
        }
        Ok(())
    }

    fn snapshot_path(&self, device_id: &str) -> PathBuf {
        self.data_dir.join(device_id).join(SNAPSHOT_FILE)
    }

    /// Loads the latest snapshot for a device.
    ///
    /// Returns `Ok(None)` if the device has never uploaded.
    pub fn load(&self, device_id: &str) -> Result<Option<StoredSnapshot>, VaultError> {
        Self::validate_device_id(device_id)?;

        let path = self.snapshot_path(device_id);
        match fs::read(&path) {
            Ok(bytes) => {
                let snapshot = serde_json::from_slice(&bytes)
                    .map_err(|e| VaultError::Decode(path, e))?;
                Ok(Some(snapshot))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::Io(path, e)),
        }
    }

    /// Upserts the snapshot slot for a device, replacing whatever was there.
    pub fn store(&self, device_id: &str, snapshot: &StoredSnapshot) -> Result<(), VaultError> {
        Self::validate_device_id(device_id)?;

        let device_dir = self.data_dir.join(device_id);
        let path = self.snapshot_path(device_id);

        fs::create_dir_all(&device_dir).map_err(|e| VaultError::Io(device_dir.clone(), e))?;

        let bytes = serde_json::to_vec(snapshot).map_err(VaultError::Encode)?;

        // Write atomically using temp file + rename
        let temp_path = path.with_extension("json.tmp");
        let mut file =
            File::create(&temp_path).map_err(|e| VaultError::Io(temp_path.clone(), e))?;
        file.write_all(&bytes)
            .map_err(|e| VaultError::Io(temp_path.clone(), e))?;
        file.sync_all()
            .map_err(|e| VaultError::Io(temp_path.clone(), e))?;
        fs::rename(&temp_path, &path).map_err(|e| VaultError::Io(path, e))?;

        Ok(())
    }
}
