mod expense;
mod note;
mod profile;
mod reminder;
mod sync_cmd;
mod trip;

pub use expense::ExpenseCommand;
pub use note::NoteCommand;
pub use profile::ProfileCommand;
pub use reminder::ReminderCommand;
pub use sync_cmd::SyncCommand;
pub use trip::TripCommand;

use clap::ValueEnum;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
