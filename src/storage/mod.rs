//! Storage module for proseclock
//!
//! Read-only SQLite quote store, its bootstrap from a bundled seed,
//! and the importer that builds seeds.

mod database;
pub mod import;
mod models;
mod source;

pub use database::{QuoteStore, StoreStats};
pub use models::{NewQuote, Quote};
pub use source::{BootstrapOutcome, DataSource, StoreHandle};
