//! Server-side modules for the sarathi sync endpoint.

pub mod storage;
pub mod sync;

pub use storage::{SnapshotVault, StoredSnapshot, VaultError};
pub use sync::{router, ApiKeyStore, AppState, AuthDevice};
