use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sarathi::commands::{
    ExpenseCommand, NoteCommand, ProfileCommand, ReminderCommand, SyncCommand, TripCommand,
};
use sarathi::config::Config;
use sarathi::db::{
    init_db, ExpenseRepository, ProfileRepository, ReminderRepository, TripRepository,
    VoiceNoteRepository,
};

#[derive(Parser)]
#[command(name = "sarathi")]
#[command(version)]
#[command(about = "Offline-first trip, expense and maintenance log for drivers", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the driver profile
    Profile(ProfileCommand),

    /// Manage trips
    Trip(TripCommand),

    /// Manage expenses
    Expense(ExpenseCommand),

    /// Manage maintenance reminders
    Reminder(ReminderCommand),

    /// Manage voice notes
    Note(NoteCommand),

    /// Sync with the cloud endpoint
    Sync(SyncCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sarathi=warn".into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Profile(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&ProfileRepository::new(pool)).await?;
        }
        Some(Commands::Trip(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&TripRepository::new(pool), &config).await?;
        }
        Some(Commands::Expense(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&ExpenseRepository::new(pool)).await?;
        }
        Some(Commands::Reminder(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&ReminderRepository::new(pool), &config).await?;
        }
        Some(Commands::Note(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&VoiceNoteRepository::new(pool)).await?;
        }
        Some(Commands::Sync(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(pool, &config).await?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
