//! proseclock - A literary clock for the terminal
//!
//! Every minute, show a line of prose that mentions the current time of day.

pub mod cli;
pub mod clock;
pub mod config;
pub mod daemon;
pub mod scheduler;
pub mod storage;
pub mod tui;

use thiserror::Error;

/// Main error type for proseclock
#[derive(Error, Debug)]
pub enum ProseClockError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("Could not open quote store: {0}")]
    StorageOpen(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProseClockError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "proseclock";
