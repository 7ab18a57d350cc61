use clap::{Args, Subcommand};
use sqlx::SqlitePool;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::sync::{
    check_server, ConnectivityWatcher, HttpTransport, SyncEngine, SyncOutcome, SyncScheduler,
    SyncStatus,
};

const CONNECTIVITY_POLL: Duration = Duration::from_secs(15);

#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub command: SyncSubcommand,
}

#[derive(Subcommand)]
pub enum SyncSubcommand {
    /// Run one sync attempt now
    Now,

    /// Keep syncing on a schedule until interrupted
    Watch,
}

impl SyncCommand {
    pub async fn run(&self, pool: SqlitePool, config: &Config) -> Result<(), Box<dyn Error>> {
        let transport = HttpTransport::from_config(config)?;
        let engine = Arc::new(SyncEngine::new(pool, transport));

        match &self.command {
            SyncSubcommand::Now => {
                match engine.sync_with_cloud().await {
                    SyncOutcome::Completed => {
                        let state = engine.state();
                        match state.last_sync {
                            Some(at) => println!("Synced. Acknowledged at {}.", at.to_rfc3339()),
                            None => println!("Synced."),
                        }
                    }
                    SyncOutcome::Failed => {
                        let state = engine.state();
                        let message = state.error.unwrap_or_else(|| "unknown error".to_string());
                        return Err(format!("Sync failed: {}", message).into());
                    }
                    SyncOutcome::InFlight => {
                        println!("A sync attempt is already running.");
                    }
                }
            }
            SyncSubcommand::Watch => {
                if !config.auto_sync {
                    return Err("auto sync is disabled in the config (auto_sync: false)".into());
                }

                let server_url = config
                    .server_url
                    .clone()
                    .unwrap_or_default();

                // Load the view before the first scheduled attempt fires:
                // the store is "ready" from here on.
                engine.refresh_view().await?;

                if !check_server(&server_url).await {
                    println!("Server unreachable; will sync when connectivity returns.");
                }

                let watcher = ConnectivityWatcher::start(server_url, CONNECTIVITY_POLL);
                let scheduler = SyncScheduler::start(
                    engine.clone(),
                    watcher.subscribe(),
                    Duration::from_secs(config.sync_interval_secs.max(1)),
                );

                println!(
                    "Watching; syncing every {}s. Press Ctrl-C to stop.",
                    config.sync_interval_secs
                );
                tokio::signal::ctrl_c().await?;

                // Scoped teardown: timer and connectivity listener go together.
                drop(scheduler);
                drop(watcher);

                let state = engine.state();
                if state.status == SyncStatus::Error {
                    if let Some(message) = state.error {
                        eprintln!("Last attempt failed: {}", message);
                    }
                }
                if let Some(at) = state.last_sync {
                    println!("Last successful sync: {}.", at.to_rfc3339());
                }
            }
        }
        Ok(())
    }
}
