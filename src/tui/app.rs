//! Main TUI application state and logic

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::clock::SystemClock;
use crate::config::Settings;
use crate::scheduler::{
    self, LoadState, QuoteScheduler, SchedulerConfig, SharedView, WidgetEvent,
};
use crate::storage::DataSource;
use crate::tui::screens::ClockScreen;
use crate::tui::widgets::HelpPopup;

/// Main application state
pub struct App {
    scheduler: QuoteScheduler<SharedView, SystemClock>,
    events: UnboundedReceiver<WidgetEvent>,
    view: SharedView,
    clock: ClockScreen,
    show_help: bool,
    /// Scheduler has been disabled
    quit: bool,
}

impl App {
    /// Create a new app instance and ask the scheduler for a first quote
    pub fn new(settings: &Settings) -> Self {
        let view = SharedView::default();
        let (tx, rx) = scheduler::event_channel();
        let mut scheduler = QuoteScheduler::new(
            Arc::new(DataSource::from_settings(settings)),
            view.clone(),
            SystemClock,
            SchedulerConfig::from_settings(settings),
            tx,
        );

        scheduler.dispatch(WidgetEvent::Enabled);
        scheduler.dispatch(WidgetEvent::Visible);

        Self {
            scheduler,
            events: rx,
            view,
            clock: ClockScreen::new(),
            show_help: false,
            quit: false,
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let loading = matches!(self.scheduler.state(), LoadState::Loading);

        self.clock.draw(frame, area, self.view.latest().as_ref(), loading);

        if self.show_help {
            HelpPopup::draw(frame, area);
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        if matches!(key, KeyCode::Char(' ') | KeyCode::Enter) {
            self.scheduler.dispatch(WidgetEvent::Reveal);
        }
    }

    /// Dispatch whatever the timer and the store open have queued
    pub fn update(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if self.scheduler.dispatch(event).is_break() {
                self.quit = true;
                break;
            }
        }
    }

    /// Stop the scheduler; safe to call more than once
    pub fn quit(&mut self) {
        if !self.quit {
            self.scheduler.dispatch(WidgetEvent::Disabled);
            self.quit = true;
        }
    }

    pub fn has_quit(&self) -> bool {
        self.quit
    }

    pub fn help_open(&self) -> bool {
        self.show_help
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings_in(dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.general.data_dir = dir.join("data");
        settings.store.seed_path = dir.join("missing-seed.db");
        settings
    }

    #[tokio::test]
    async fn help_opens_and_closes() {
        let tmp = tempdir().unwrap();
        let mut app = App::new(&settings_in(tmp.path()));
        assert!(!app.help_open());

        app.toggle_help();
        assert!(app.help_open());

        // any key while help is up only closes it
        app.handle_key(KeyCode::Char('x'));
        assert!(!app.help_open());
        assert!(!app.has_quit());
    }

    #[tokio::test]
    async fn quit_disables_scheduler_once() {
        let tmp = tempdir().unwrap();
        let mut app = App::new(&settings_in(tmp.path()));

        app.quit();
        assert!(app.has_quit());
        assert!(matches!(app.scheduler.state(), LoadState::Uninitialized));

        app.quit();
        app.update();
        assert!(app.has_quit());
    }
}
