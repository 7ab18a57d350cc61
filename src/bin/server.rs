//! Sarathi Sync Server
//!
//! Stores the latest snapshot uploaded by each device and hands it back on
//! request. The endpoint is a dumb acknowledging sink: last write wins, no
//! history, no merging.
//!
//! # Configuration
//!
//! Environment variables:
//! - `SARATHI_PORT`: Port to listen on (default: 8080)
//! - `SARATHI_DATA_DIR`: Directory to store snapshots (default: ~/.local/share/sarathi-server)
//! - `SARATHI_SERVER_CONFIG`: Path to config file (default: ~/.config/sarathi-server/config.yaml)
//!
//! # Config File Format
//!
//! ```yaml
//! api_keys:
//!   - key: "your-secret-key-here"
//!     device_id: "truck-01"
//! ```
//!
//! # Endpoints
//!
//! - `GET /health`: Health check endpoint (no auth required)
//! - `POST /sync`: Store a snapshot (auth required)
//! - `GET /sync`: Read the latest snapshot (auth required)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sarathi::server::{router, ApiKeyStore, AppState, SnapshotVault};

/// Server configuration
#[derive(Debug, Clone)]
struct Config {
    port: u16,
    data_dir: PathBuf,
    config_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let port = std::env::var("SARATHI_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let data_dir = std::env::var("SARATHI_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("sarathi-server")
            });

        let config_path = std::env::var("SARATHI_SERVER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("sarathi-server")
                    .join("config.yaml")
            });

        Self {
            port,
            data_dir,
            config_path,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sarathi_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        tracing::error!("Failed to create data directory: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Config file: {}", config.config_path.display());

    let state = AppState {
        vault: Arc::new(SnapshotVault::new(config.data_dir)),
        api_keys: Arc::new(ApiKeyStore::load(&config.config_path)),
    };

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
