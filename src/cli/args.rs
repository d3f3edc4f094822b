//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// proseclock - Tells the time with a line from a book
#[derive(Parser, Debug)]
#[command(name = "proseclock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the quote for the current minute
    Now {
        /// Pretend it is this time of day (HH:MM)
        #[arg(long, value_name = "HH:MM")]
        at: Option<String>,

        /// Print the display as JSON
        #[arg(long)]
        json: bool,
    },

    /// Launch the full-screen clock
    Watch,

    /// Print a new quote every minute until interrupted
    Follow,

    /// Show what the daemon is displaying
    Show,

    /// Reveal the origin of the quote the daemon is displaying
    Reveal,

    /// Show how much of the day the quote store covers
    Stats,

    /// Daemon management commands
    #[command(subcommand)]
    Daemon(DaemonCommand),

    /// Seed database management
    #[command(subcommand)]
    Seed(SeedCommand),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Start the background daemon
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,
    },

    /// Stop the running daemon
    Stop,

    /// Check daemon status
    Status,
}

#[derive(Subcommand, Debug)]
pub enum SeedCommand {
    /// Build a seed database from a pipe-delimited quote file
    Import {
        /// Quote file with lines of `HH:MM|phrase|text|book|author`
        csv: PathBuf,

        /// Seed database to create
        output: PathBuf,

        /// Overwrite the output if it exists
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
