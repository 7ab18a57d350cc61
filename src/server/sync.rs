//! HTTP routes for the sync endpoint.
//!
//! - `GET /health`: reachability probe (no auth)
//! - `POST /sync`: store the device's latest snapshot (auth required)
//! - `GET /sync`: return the device's latest snapshot (auth required)
//!
//! Authentication is a Bearer API key resolved to a device id; each device
//! gets its own snapshot slot in the vault.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::{SnapshotVault, StoredSnapshot};
use crate::sync::{SyncAck, SyncRequest};

/// API key entry in the server config file.
#[derive(Debug, Clone, Deserialize)]
struct ApiKeyEntry {
    key: String,
    device_id: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    api_keys: Vec<ApiKeyEntry>,
}

/// Authenticated device info, added to request extensions after auth.
#[derive(Debug, Clone)]
pub struct AuthDevice {
    pub device_id: String,
}

/// API key store - maps key -> device.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyStore {
    keys: HashMap<String, AuthDevice>,
}

impl ApiKeyStore {
    /// Load API keys from a YAML config file.
    pub fn load(config_path: &PathBuf) -> Self {
        let keys = match std::fs::read_to_string(config_path) {
            Ok(contents) => match serde_yaml::from_str::<ConfigFile>(&contents) {
                Ok(config) => {
                    let mut map = HashMap::new();
                    for entry in config.api_keys {
                        map.insert(
                            entry.key,
                            AuthDevice {
                                device_id: entry.device_id,
                            },
                        );
                    }
                    tracing::info!("Loaded {} API key(s)", map.len());
                    map
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}", e);
                    HashMap::new()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
                tracing::warn!("No API keys loaded - all authenticated requests will fail");
                HashMap::new()
            }
        };

        Self { keys }
    }

    /// Build a store from explicit entries (used by tests).
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let keys = entries
            .into_iter()
            .map(|(key, device_id)| (key, AuthDevice { device_id }))
            .collect();
        Self { keys }
    }

    fn validate(&self, key: &str) -> Option<AuthDevice> {
        self.keys.get(key).cloned()
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<SnapshotVault>,
    pub api_keys: Arc<ApiKeyStore>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let api_key = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        Some(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    error: "invalid_auth",
                    message: "Authorization header must use Bearer scheme".to_string(),
                }),
            )
                .into_response();
        }
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    error: "missing_auth",
                    message: "Authorization header required".to_string(),
                }),
            )
                .into_response();
        }
    };

    match state.api_keys.validate(api_key) {
        Some(device) => {
            request.extensions_mut().insert(device);
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "invalid_key",
                message: "Invalid API key".to_string(),
            }),
        )
            .into_response(),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Stores the device's snapshot and acknowledges with the timestamp the
/// client sent (falling back to server time if it sent none usable).
async fn push_snapshot(
    State(state): State<AppState>,
    Extension(device): Extension<AuthDevice>,
    Json(request): Json<SyncRequest>,
) -> Response {
    let received_at = if request.timestamp.is_empty() {
        Utc::now().to_rfc3339()
    } else {
        request.timestamp.clone()
    };

    let snapshot = StoredSnapshot {
        payload: request.payload,
        timestamp: request.timestamp,
        received_at: received_at.clone(),
    };

    if let Err(e) = state.vault.store(&device.device_id, &snapshot) {
        tracing::error!(device_id = %device.device_id, "failed to store snapshot: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "storage_failed",
                message: e.to_string(),
            }),
        )
            .into_response();
    }

    tracing::info!(device_id = %device.device_id, "snapshot stored");
    Json(SyncAck {
        status: "ok".to_string(),
        received_at: Some(received_at),
    })
    .into_response()
}

/// Returns the device's latest snapshot, or `{"status":"no-data"}` if the
/// device has never uploaded.
async fn read_snapshot(
    State(state): State<AppState>,
    Extension(device): Extension<AuthDevice>,
) -> Response {
    match state.vault.load(&device.device_id) {
        Ok(Some(snapshot)) => Json(snapshot).into_response(),
        Ok(None) => Json(serde_json::json!({ "status": "no-data" })).into_response(),
        Err(e) => {
            tracing::error!(device_id = %device.device_id, "failed to load snapshot: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "storage_failed",
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Builds the endpoint router over the given state.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    let protected_routes = Router::new()
        .route("/sync", get(read_snapshot).post(push_snapshot))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
