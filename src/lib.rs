//! Sarathi
//!
//! Local-first trip, expense and maintenance tracking for drivers who are
//! often offline. All records live in an embedded SQLite database and sync
//! to a remote endpoint whenever connectivity allows.

pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod server;
pub mod sync;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
