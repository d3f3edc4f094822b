//! TUI module for proseclock
//!
//! Full-screen clock using ratatui.

mod app;
pub mod screens;
pub mod widgets;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::time::Duration;

use crate::config::Settings;
pub use app::App;

/// Run the TUI application
pub async fn run(settings: &Settings) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings);

    // Run main loop
    let result = run_app(&mut terminal, &mut app).await;
    app.quit();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| app.draw(f))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            if !app.help_open() {
                                return Ok(());
                            }
                            app.close_help();
                        }
                        KeyCode::Char('?') => {
                            app.toggle_help();
                        }
                        _ => {
                            app.handle_key(key.code);
                        }
                    }
                }
            }
        }

        // Let the scheduler catch up on ticks and store opens
        app.update();
        if app.has_quit() {
            return Ok(());
        }

        // Yield so timer and open tasks get to run
        tokio::task::yield_now().await;
    }
}
