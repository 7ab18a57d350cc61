mod expense;
mod language;
mod profile;
mod reminder;
mod trip;
mod voice_note;

pub use expense::{Expense, ExpenseCategory, NewExpense, PaymentMode};
pub use language::Language;
pub use profile::Profile;
pub use reminder::{NewReminder, Reminder};
pub use trip::{NewTrip, Trip, TripStatus};
pub use voice_note::{NewVoiceNote, VoiceNote};
