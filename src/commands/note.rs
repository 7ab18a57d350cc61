use chrono::Utc;
use clap::{Args, Subcommand};
use std::error::Error;

use super::OutputFormat;
use crate::db::VoiceNoteRepository;
use crate::models::NewVoiceNote;

#[derive(Args)]
pub struct NoteCommand {
    #[command(subcommand)]
    pub command: NoteSubcommand,
}

#[derive(Subcommand)]
pub enum NoteSubcommand {
    /// Record a transcribed voice note
    Add {
        /// The transcript text
        transcript: String,

        /// Language of the note (en or hi)
        #[arg(long, default_value = "hi")]
        language: String,
    },

    /// List all voice notes
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl NoteCommand {
    pub async fn run(&self, repo: &VoiceNoteRepository) -> Result<(), Box<dyn Error>> {
        match &self.command {
            NoteSubcommand::Add {
                transcript,
                language,
            } => {
                let note = NewVoiceNote {
                    transcript: transcript.clone(),
                    language: language.parse()?,
                    created_at: Utc::now(),
                };
                repo.insert(&note).await?;

                let notes = repo.fetch_all().await?;
                println!("Voice note saved ({} total).", notes.len());
            }
            NoteSubcommand::List { format } => {
                let notes = repo.fetch_all().await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&notes)?),
                    OutputFormat::Text => {
                        if notes.is_empty() {
                            println!("No voice notes.");
                        }
                        for note in notes {
                            println!(
                                "#{} [{}] {} ({})",
                                note.id,
                                note.language,
                                note.transcript,
                                note.created_at.format("%Y-%m-%d %H:%M")
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
