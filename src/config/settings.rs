//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::clock::MINUTES_PER_DAY;
use crate::ProseClockError;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Quote store location
    #[serde(default)]
    pub store: StoreSettings,

    /// Refresh timer and fallback search
    #[serde(default)]
    pub schedule: ScheduleSettings,

    /// Presentation settings
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory holding the bootstrapped quote store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Bundled seed database copied into the data directory on first run
    #[serde(default = "default_seed_path")]
    pub seed_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// How many minutes to search backwards when nothing matches right after loading
    #[serde(default = "default_fallback_attempts")]
    pub fallback_attempts: u32,

    /// Seconds between refresh ticks once the timer is armed
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Origin line template, `{book}` and `{author}` are substituted
    #[serde(default = "default_origin_format")]
    pub origin_format: String,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("fi", "proseclock", "proseclock")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/proseclock"))
}

fn default_seed_path() -> PathBuf {
    let mut path = default_data_dir();
    path.push("seed");
    path.push("quotes.db");
    path
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fallback_attempts() -> u32 {
    20
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_origin_format() -> String {
    "{book}, by {author}".to_string()
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            seed_path: default_seed_path(),
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            fallback_attempts: default_fallback_attempts(),
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            origin_format: default_origin_format(),
        }
    }
}

impl ScheduleSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the scheduler cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.schedule.fallback_attempts == 0 {
            return Err(ProseClockError::Config(
                "schedule.fallback_attempts must be at least 1".to_string(),
            ));
        }
        if self.schedule.fallback_attempts > MINUTES_PER_DAY as u32 {
            return Err(ProseClockError::Config(format!(
                "schedule.fallback_attempts must be at most {}",
                MINUTES_PER_DAY
            )));
        }
        if self.schedule.tick_interval_secs == 0 {
            return Err(ProseClockError::Config(
                "schedule.tick_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("PROSECLOCK_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.general.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(seed) = std::env::var("PROSECLOCK_SEED_PATH") {
            if !seed.trim().is_empty() {
                self.store.seed_path = PathBuf::from(seed);
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("fi", "proseclock", "proseclock")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the live quote store path
    pub fn database_path(&self) -> PathBuf {
        self.general.data_dir.join("quotes.db")
    }

    /// Get the Unix socket path for IPC
    pub fn socket_path(&self) -> PathBuf {
        let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"));
        runtime_dir.join("proseclock.sock")
    }

    /// Get the PID file path
    pub fn pid_path(&self) -> PathBuf {
        let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"));
        runtime_dir.join("proseclock.pid")
    }

    /// Ensure all required directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.general.data_dir)?;
        Ok(())
    }
}
