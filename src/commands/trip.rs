use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use std::error::Error;

use super::OutputFormat;
use crate::config::Config;
use crate::db::{EditPolicy, TripRepository};
use crate::models::{NewTrip, TripStatus};

#[derive(Args)]
pub struct TripCommand {
    #[command(subcommand)]
    pub command: TripSubcommand,
}

#[derive(Subcommand)]
pub enum TripSubcommand {
    /// Schedule a new trip
    Add {
        /// Trip title
        title: String,

        /// Starting point
        #[arg(long)]
        origin: String,

        /// Destination
        #[arg(long)]
        destination: String,

        /// Departure time (RFC 3339), defaults to now
        #[arg(long)]
        departure: Option<String>,

        /// Expected arrival time (RFC 3339)
        #[arg(long)]
        arrival: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List all trips
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change the status of a trip
    Status {
        /// Trip id
        id: i64,

        /// New status: planned, in-progress or completed
        status: String,
    },
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, Box<dyn Error>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

impl TripCommand {
    pub async fn run(&self, repo: &TripRepository, config: &Config) -> Result<(), Box<dyn Error>> {
        match &self.command {
            TripSubcommand::Add {
                title,
                origin,
                destination,
                departure,
                arrival,
                notes,
            } => {
                let trip = NewTrip {
                    title: title.clone(),
                    origin: origin.clone(),
                    destination: destination.clone(),
                    departure_time: departure
                        .as_deref()
                        .map(parse_time)
                        .transpose()?
                        .unwrap_or_else(Utc::now),
                    arrival_time: arrival.as_deref().map(parse_time).transpose()?,
                    notes: notes.clone(),
                    status: TripStatus::Planned,
                };
                repo.insert(&trip).await?;

                let trips = repo.fetch_all().await?;
                println!("Trip scheduled ({} total).", trips.len());
            }
            TripSubcommand::List { format } => {
                let trips = repo.fetch_all().await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&trips)?),
                    OutputFormat::Text => {
                        if trips.is_empty() {
                            println!("No trips recorded.");
                        }
                        for trip in trips {
                            let synced = if trip.synced { "synced" } else { "unsynced" };
                            println!(
                                "#{} {} -> {} [{}] {} ({})",
                                trip.id, trip.origin, trip.destination, trip.status, trip.title,
                                synced
                            );
                        }
                    }
                }
            }
            TripSubcommand::Status { id, status } => {
                let status: TripStatus = status.parse()?;
                let policy = EditPolicy::from_config(config.resync_on_edit);
                repo.update_status(*id, status, policy).await?;
                println!("Trip #{} is now {}.", id, status);
            }
        }
        Ok(())
    }
}
