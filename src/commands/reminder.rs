use chrono::NaiveDate;
use clap::{Args, Subcommand};
use std::error::Error;

use super::OutputFormat;
use crate::config::Config;
use crate::db::{EditPolicy, ReminderRepository};
use crate::models::NewReminder;

#[derive(Args)]
pub struct ReminderCommand {
    #[command(subcommand)]
    pub command: ReminderSubcommand,
}

#[derive(Subcommand)]
pub enum ReminderSubcommand {
    /// Add a maintenance or paperwork reminder
    Add {
        /// What the reminder is for, e.g. "Insurance renewal"
        reminder_type: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,
    },

    /// List all reminders
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Mark a reminder as completed
    Done {
        /// Reminder id
        id: i64,

        /// Mark it as not completed instead
        #[arg(long)]
        undo: bool,
    },
}

impl ReminderCommand {
    pub async fn run(
        &self,
        repo: &ReminderRepository,
        config: &Config,
    ) -> Result<(), Box<dyn Error>> {
        match &self.command {
            ReminderSubcommand::Add { reminder_type, due } => {
                let reminder = NewReminder {
                    reminder_type: reminder_type.clone(),
                    due_on: due.parse::<NaiveDate>()?,
                    is_completed: false,
                };
                repo.upsert(&reminder).await?;

                let reminders = repo.fetch_all().await?;
                println!("Reminder added ({} total).", reminders.len());
            }
            ReminderSubcommand::List { format } => {
                let reminders = repo.fetch_all().await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&reminders)?)
                    }
                    OutputFormat::Text => {
                        if reminders.is_empty() {
                            println!("No reminders.");
                        }
                        for reminder in reminders {
                            let mark = if reminder.is_completed { "x" } else { " " };
                            println!(
                                "[{}] #{} {} due {}",
                                mark, reminder.id, reminder.reminder_type, reminder.due_on
                            );
                        }
                    }
                }
            }
            ReminderSubcommand::Done { id, undo } => {
                let policy = EditPolicy::from_config(config.resync_on_edit);
                repo.set_completed(*id, !undo, policy).await?;
                if *undo {
                    println!("Reminder #{} reopened.", id);
                } else {
                    println!("Reminder #{} completed.", id);
                }
            }
        }
        Ok(())
    }
}
