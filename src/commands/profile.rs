use clap::{Args, Subcommand};
use std::error::Error;

use crate::db::ProfileRepository;

#[derive(Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Show the stored driver profile
    Show,

    /// Create or replace the driver profile
    Set {
        /// Driver name
        name: String,

        /// Preferred language (en or hi)
        #[arg(long, default_value = "hi")]
        language: String,
    },
}

impl ProfileCommand {
    pub async fn run(&self, repo: &ProfileRepository) -> Result<(), Box<dyn Error>> {
        match &self.command {
            ProfileSubcommand::Show => {
                match repo.fetch().await? {
                    Some(profile) => {
                        println!("{} ({})", profile.name, profile.preferred_language);
                    }
                    None => println!("No profile set. Use 'sarathi profile set <name>'."),
                }
            }
            ProfileSubcommand::Set { name, language } => {
                let language = language.parse()?;
                repo.upsert(name, language).await?;
                // Re-read so the confirmation reflects stored truth.
                if let Some(profile) = repo.fetch().await? {
                    println!("Profile saved: {} ({})", profile.name, profile.preferred_language);
                }
            }
        }
        Ok(())
    }
}
