//! Configuration module for proseclock
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{DisplaySettings, GeneralSettings, ScheduleSettings, Settings, StoreSettings};
