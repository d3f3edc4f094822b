//! proseclock - Tells the time with a line from a book
//!
//! Entry point for the proseclock CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use proseclock::cli::{Cli, Commands};
use proseclock::config::Settings;

fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            proseclock::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            let level = if cli.verbose {
                "debug"
            } else {
                settings.general.log_level.as_str()
            };
            init_logging(level);

            // Execute command
            match command {
                Commands::Now { at, json } => {
                    proseclock::cli::commands::show_now(&settings, at, json).await?;
                }
                Commands::Watch => {
                    proseclock::tui::run(&settings).await?;
                }
                Commands::Follow => {
                    proseclock::cli::commands::follow(&settings).await?;
                }
                Commands::Show => {
                    proseclock::cli::commands::show_display(&settings).await?;
                }
                Commands::Reveal => {
                    proseclock::cli::commands::reveal(&settings).await?;
                }
                Commands::Stats => {
                    proseclock::cli::commands::show_stats(&settings)?;
                }
                Commands::Daemon(daemon_cmd) => {
                    proseclock::cli::commands::daemon_command(&settings, daemon_cmd).await?;
                }
                Commands::Seed(seed_cmd) => {
                    proseclock::cli::commands::seed_command(&settings, seed_cmd)?;
                }
                Commands::Config(config_cmd) => {
                    proseclock::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
