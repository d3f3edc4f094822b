//! CLI command implementations

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use crate::cli::args::{ConfigCommand, DaemonCommand, SeedCommand};
use crate::clock::{format_minute, parse_minute, Clock, FixedClock, SystemClock, MINUTES_PER_DAY};
use crate::config::Settings;
use crate::daemon::client::DaemonClient;
use crate::daemon::ipc::{DaemonRequest, DaemonResponse};
use crate::scheduler::render::format_text;
use crate::scheduler::{
    self, QuoteScheduler, RenderRequest, SchedulerConfig, SharedView, TextSink, WidgetEvent,
};
use crate::storage::{import, DataSource, QuoteStore};

/// Print the quote for the current minute, or for `at` if given
pub async fn show_now(settings: &Settings, at: Option<String>, json: bool) -> Result<()> {
    let minute = match at {
        Some(time) => parse_minute(&time)?,
        None => SystemClock.minute_of_day(),
    };

    let view = SharedView::default();
    let (events, mut rx) = scheduler::event_channel();
    let mut scheduler = QuoteScheduler::new(
        Arc::new(DataSource::from_settings(settings)),
        view.clone(),
        FixedClock::new(minute),
        SchedulerConfig::from_settings(settings),
        events,
    );

    scheduler.dispatch(WidgetEvent::Enabled);
    scheduler.dispatch(WidgetEvent::Visible);

    while let Some(event) = rx.recv().await {
        match event {
            WidgetEvent::Opened { result: Err(e), .. } => {
                scheduler.dispatch(WidgetEvent::Disabled);
                return Err(anyhow::Error::new(e).context("Failed to open quote store"));
            }
            opened @ WidgetEvent::Opened { .. } => {
                scheduler.dispatch(opened);
                break;
            }
            other => {
                scheduler.dispatch(other);
            }
        }
    }

    let shown = view.latest();
    scheduler.dispatch(WidgetEvent::Disabled);

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    match shown {
        Some(request) => print!("{}", format_text(&request, std::io::stdout().is_terminal())),
        None => println!("No quote found near {}", format_minute(minute)),
    }

    Ok(())
}

/// Print a quote every minute until Ctrl-C
pub async fn follow(settings: &Settings) -> Result<()> {
    let sink = TextSink::new(std::io::stdout(), std::io::stdout().is_terminal());
    let (events, rx) = scheduler::event_channel();
    let scheduler = QuoteScheduler::new(
        Arc::new(DataSource::from_settings(settings)),
        sink,
        SystemClock,
        SchedulerConfig::from_settings(settings),
        events.clone(),
    );

    let _ = events.send(WidgetEvent::Enabled);
    let _ = events.send(WidgetEvent::Visible);
    let handle = tokio::spawn(scheduler::run(scheduler, rx));

    tokio::signal::ctrl_c().await?;

    let _ = events.send(WidgetEvent::Disabled);
    handle.await?;

    Ok(())
}

/// Show what the daemon is displaying
pub async fn show_display(settings: &Settings) -> Result<()> {
    let mut client = match DaemonClient::connect(settings).await {
        Ok(c) => c,
        Err(_) => {
            println!("Daemon is not running");
            return Ok(());
        }
    };

    let response = client.send(DaemonRequest::GetDisplay).await?;
    print_display(response, "get display")
}

/// Ask the daemon to show the origin of its quote
pub async fn reveal(settings: &Settings) -> Result<()> {
    let mut client = match DaemonClient::connect(settings).await {
        Ok(c) => c,
        Err(_) => {
            println!("Daemon is not running");
            return Ok(());
        }
    };

    let response = client.send(DaemonRequest::Reveal).await?;
    print_display(response, "reveal")
}

fn print_display(response: DaemonResponse, action: &str) -> Result<()> {
    match response {
        DaemonResponse::Display(Some(request)) => print_request(&request),
        DaemonResponse::Display(None) => println!("Nothing on display yet"),
        DaemonResponse::Error { message } => {
            anyhow::bail!("Failed to {}: {}", action, message);
        }
        _ => {
            anyhow::bail!("Unexpected response from daemon");
        }
    }

    Ok(())
}

fn print_request(request: &RenderRequest) {
    print!("{}", format_text(request, std::io::stdout().is_terminal()));
}

/// Show quote count and coverage of the live store
pub fn show_stats(settings: &Settings) -> Result<()> {
    let source = DataSource::from_settings(settings);
    source
        .bootstrap()
        .context("Failed to create the quote store")?;

    let store = QuoteStore::open_read_only(source.db_path())?;
    let stats = store.get_stats()?;

    let coverage = stats.covered_minutes as f64 / MINUTES_PER_DAY as f64 * 100.0;
    println!("Store: {}", source.db_path().display());
    println!("Quotes: {}", stats.total_quotes);
    println!(
        "Minutes covered: {} of {} ({:.1}%)",
        stats.covered_minutes, MINUTES_PER_DAY, coverage
    );
    println!("Longest gap: {} minutes", stats.longest_gap);

    Ok(())
}

/// Handle seed subcommands
pub fn seed_command(settings: &Settings, cmd: SeedCommand) -> Result<()> {
    match cmd {
        SeedCommand::Import { csv, output, force } => {
            if same_file(&output, &settings.database_path()) {
                anyhow::bail!(
                    "Refusing to overwrite the live store at {}",
                    output.display()
                );
            }

            let count = import::import_file(&csv, &output, force)
                .with_context(|| format!("Failed to import {}", csv.display()))?;
            println!("Imported {} quotes into {}", count, output.display());
        }
    }

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Handle daemon subcommands
pub async fn daemon_command(settings: &Settings, cmd: DaemonCommand) -> Result<()> {
    match cmd {
        DaemonCommand::Start { foreground } => {
            if foreground {
                crate::daemon::run_foreground(settings).await?;
            } else {
                crate::daemon::start_daemon(settings)?;
                println!("Daemon started");
            }
        }
        DaemonCommand::Stop => {
            let mut client = DaemonClient::connect(settings).await?;
            client.send(DaemonRequest::Shutdown).await?;
            println!("Daemon stopped");
        }
        DaemonCommand::Status => match DaemonClient::connect(settings).await {
            Ok(mut client) => {
                let response = client.send(DaemonRequest::Ping).await?;
                if matches!(response, DaemonResponse::Pong) {
                    match crate::daemon::live_pid(&settings.pid_path()) {
                        Some(pid) => println!("Daemon is running (PID: {})", pid),
                        None => println!("Daemon is running"),
                    }
                }
            }
            Err(_) => {
                println!("Daemon is not running");
            }
        },
    }

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}
